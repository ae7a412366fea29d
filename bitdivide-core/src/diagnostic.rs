use core::fmt;

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote_spanned};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
  Error,
  Warning,
}

/// Stable diagnostic codes. The numeric ids are part of the public contract.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Code {
  InvalidAccessibility,
  ContainerNotExtensible,
  CapacityExceeded,
  DuplicateName,
  UnsupportedSharedBacking,
  InvalidWidth,
  EmptySchema,
}

impl Code {
  pub fn id(self) -> &'static str {
    match self {
      Code::InvalidAccessibility => "E0001",
      Code::ContainerNotExtensible => "E0002",
      Code::CapacityExceeded => "E0003",
      Code::DuplicateName => "E0004",
      Code::UnsupportedSharedBacking => "E0005",
      Code::InvalidWidth => "E0006",
      Code::EmptySchema => "W0001",
    }
  }

  pub fn severity(self) -> Severity {
    match self {
      Code::EmptySchema => Severity::Warning,
      _ => Severity::Error,
    }
  }
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
  pub code: Code,
  pub severity: Severity,
  pub message: String,
  pub span: Span,
}

impl Diagnostic {
  pub fn new(code: Code, span: Span, message: impl Into<String>) -> Self {
    Self { code, severity: code.severity(), message: message.into(), span }
  }

  pub fn is_fatal(&self) -> bool {
    self.severity == Severity::Error
  }

  /// Lower into tokens the compiler reports at `span`.
  ///
  /// Errors become `compile_error!`. Stable Rust has no warning API for
  /// procedural macros, so warnings use a deprecated item that the expansion
  /// immediately references.
  pub fn to_tokens(&self) -> TokenStream {
    let text = self.to_string();
    match self.severity {
      Severity::Error => syn::Error::new(self.span, text).to_compile_error(),
      Severity::Warning => {
        let marker = format_ident!("BitDivisible{}", self.code.id(), span = self.span);
        quote_spanned! {self.span=>
          const _: () = {
            #[deprecated(note = #text)]
            struct #marker;
            let _ = #marker;
          };
        }
      }
    }
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.code.id(), self.message)
  }
}

/// Lower every diagnostic, in order.
pub fn to_tokens(diagnostics: &[Diagnostic]) -> TokenStream {
  diagnostics.iter().map(Diagnostic::to_tokens).collect()
}
