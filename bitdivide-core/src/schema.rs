//! In-memory model of one backing field and the sub-fields declared on it.
//!
//! The model is plain data. Front ends (the `#[bit_divisible]` macro, or any
//! other tool that can read declarations) build it; the rest of the crate only
//! reads it.

use proc_macro2::{Ident, Span, TokenStream};
use quote::{ToTokens, format_ident, quote};
use syn::{Generics, Path};

/// Fixed-width primitive integers usable as backing or value types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntegerType {
  U8,
  U16,
  U32,
  U64,
  U128,
  I8,
  I16,
  I32,
  I64,
  I128,
}

impl IntegerType {
  pub const ALL: [IntegerType; 10] = [
    IntegerType::U8,
    IntegerType::U16,
    IntegerType::U32,
    IntegerType::U64,
    IntegerType::U128,
    IntegerType::I8,
    IntegerType::I16,
    IntegerType::I32,
    IntegerType::I64,
    IntegerType::I128,
  ];

  pub fn bits(self) -> u32 {
    match self {
      IntegerType::U8 | IntegerType::I8 => 8,
      IntegerType::U16 | IntegerType::I16 => 16,
      IntegerType::U32 | IntegerType::I32 => 32,
      IntegerType::U64 | IntegerType::I64 => 64,
      IntegerType::U128 | IntegerType::I128 => 128,
    }
  }

  pub fn is_signed(self) -> bool {
    matches!(self, IntegerType::I8 | IntegerType::I16 | IntegerType::I32 | IntegerType::I64 | IntegerType::I128)
  }

  pub fn name(self) -> &'static str {
    match self {
      IntegerType::U8 => "u8",
      IntegerType::U16 => "u16",
      IntegerType::U32 => "u32",
      IntegerType::U64 => "u64",
      IntegerType::U128 => "u128",
      IntegerType::I8 => "i8",
      IntegerType::I16 => "i16",
      IntegerType::I32 => "i32",
      IntegerType::I64 => "i64",
      IntegerType::I128 => "i128",
    }
  }

  pub fn from_name(name: &str) -> Option<IntegerType> {
    IntegerType::ALL.into_iter().find(|t| t.name() == name)
  }

  /// Resolve a single-segment type path such as `u32`.
  pub fn from_type(ty: &syn::Type) -> Option<IntegerType> {
    match ty {
      syn::Type::Path(tp) if tp.qself.is_none() => tp.path.get_ident().and_then(|id| Self::from_name(&id.to_string())),
      syn::Type::Group(g) => Self::from_type(&g.elem),
      syn::Type::Paren(p) => Self::from_type(&p.elem),
      _ => None,
    }
  }

  /// Name of the matching `core::sync::atomic` type. 128-bit atomics are not stable.
  pub fn atomic(self) -> Option<Ident> {
    if self.bits() == 128 {
      return None;
    }
    let prefix = if self.is_signed() { "AtomicI" } else { "AtomicU" };
    Some(format_ident!("{}{}", prefix, self.bits()))
  }
}

impl ToTokens for IntegerType {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    format_ident!("{}", self.name()).to_tokens(tokens);
  }
}

/// `width` low bits set.
pub(crate) fn ones(width: u32) -> u128 {
  if width >= 128 { u128::MAX } else { (1u128 << width) - 1 }
}

/// What a sub-field reads back as.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
  Bool,
  Int(IntegerType),
}

impl ValueKind {
  pub fn from_type(ty: &syn::Type) -> Option<ValueKind> {
    if let syn::Type::Path(tp) = ty {
      if tp.qself.is_none() && tp.path.is_ident("bool") {
        return Some(ValueKind::Bool);
      }
    }
    IntegerType::from_type(ty).map(ValueKind::Int)
  }
}

impl ToTokens for ValueKind {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    match self {
      ValueKind::Bool => tokens.extend(quote!(bool)),
      ValueKind::Int(ty) => ty.to_tokens(tokens),
    }
  }
}

/// One `(kind, width, name)` declaration, in source order.
#[derive(Clone, Debug)]
pub struct SubFieldDecl {
  pub kind: ValueKind,
  /// Declared width. Ignored for booleans.
  pub width: u32,
  pub name: Ident,
  pub span: Span,
}

impl SubFieldDecl {
  pub fn new(kind: ValueKind, width: u32, name: Ident) -> Self {
    let span = name.span();
    Self { kind, width, name, span }
  }

  /// Width after the boolean rule is applied.
  pub fn effective_width(&self) -> u32 {
    match self.kind {
      ValueKind::Bool => 1,
      ValueKind::Int(_) => self.width,
    }
  }

  /// Name of the combined mutator's parameter for this sub-field.
  pub fn param_name(&self) -> Ident {
    param_ident(&self.name)
  }
}

/// Container visibility, mapped onto Rust's visibility levels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Accessibility {
  /// Inherited (no `pub`).
  Private,
  /// `pub(super)`.
  Protected,
  /// `pub(crate)`.
  Internal,
  /// `pub`.
  Public,
}

impl ToTokens for Accessibility {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    tokens.extend(match self {
      Accessibility::Private => quote!(),
      Accessibility::Protected => quote!(pub(super)),
      Accessibility::Internal => quote!(pub(crate)),
      Accessibility::Public => quote!(pub),
    })
  }
}

/// Accessibility as declared in source, which may fall outside the supported set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessibilityDecl {
  Known(Accessibility),
  Unrecognized(String),
}

impl AccessibilityDecl {
  pub fn from_visibility(vis: &syn::Visibility) -> Self {
    match vis {
      syn::Visibility::Inherited => AccessibilityDecl::Known(Accessibility::Private),
      syn::Visibility::Public(_) => AccessibilityDecl::Known(Accessibility::Public),
      syn::Visibility::Restricted(r) if r.in_token.is_none() && r.path.is_ident("crate") => {
        AccessibilityDecl::Known(Accessibility::Internal)
      }
      syn::Visibility::Restricted(r) if r.in_token.is_none() && r.path.is_ident("super") => {
        AccessibilityDecl::Known(Accessibility::Protected)
      }
      syn::Visibility::Restricted(r) if r.in_token.is_none() && r.path.is_ident("self") => {
        AccessibilityDecl::Known(Accessibility::Private)
      }
      other => AccessibilityDecl::Unrecognized(other.to_token_stream().to_string()),
    }
  }

  pub fn known(&self) -> Option<Accessibility> {
    match self {
      AccessibilityDecl::Known(a) => Some(*a),
      AccessibilityDecl::Unrecognized(_) => None,
    }
  }
}

/// The type that receives the generated members.
#[derive(Clone, Debug)]
pub struct ContainerInfo {
  pub name: Ident,
  pub accessibility: AccessibilityDecl,
  /// Whether members may be attached to it at all.
  pub extensible: bool,
  /// Module path the container lives under, when the output is emitted away from it.
  pub namespace: Option<Path>,
  pub generics: Generics,
}

impl ContainerInfo {
  pub fn new(name: Ident, accessibility: AccessibilityDecl) -> Self {
    Self { name, accessibility, extensible: true, namespace: None, generics: Generics::default() }
  }

  pub fn span(&self) -> Span {
    self.name.span()
  }

  /// `Name` or `namespace::Name`.
  pub fn type_path(&self) -> TokenStream {
    let name = &self.name;
    match &self.namespace {
      Some(ns) => quote!(#ns::#name),
      None => quote!(#name),
    }
  }
}

/// Everything known about one backing field before allocation.
#[derive(Clone, Debug)]
pub struct BackingFieldSchema {
  pub field: Ident,
  pub backing: IntegerType,
  /// One value shared by all instances instead of one per instance.
  pub shared: bool,
  pub declarations: Vec<SubFieldDecl>,
  pub container: ContainerInfo,
  pub span: Span,
}

impl BackingFieldSchema {
  pub fn new(container: ContainerInfo, field: Ident, backing: IntegerType) -> Self {
    let span = field.span();
    Self { field, backing, shared: false, declarations: Vec::new(), container, span }
  }

  pub fn shared(mut self, shared: bool) -> Self {
    self.shared = shared;
    self
  }

  pub fn with(mut self, decl: SubFieldDecl) -> Self {
    self.declarations.push(decl);
    self
  }

  pub fn is_empty(&self) -> bool {
    self.declarations.is_empty()
  }

  /// Identifier of the combined mutator: `set_<field>`.
  pub fn mutator_name(&self) -> Ident {
    format_ident!("set_{}", unraw(&self.field), span = self.field.span())
  }

  /// Identifier of the private accessor for a shared backing cell.
  pub fn cell_name(&self) -> Ident {
    format_ident!("__{}_cell", unraw(&self.field), span = self.field.span())
  }
}

pub(crate) fn unraw(id: &Ident) -> String {
  let s = id.to_string();
  match s.strip_prefix("r#") {
    Some(rest) => rest.to_string(),
    None => s,
  }
}

/// Sub-field name with its first letter lowercased, escaped if that makes it a keyword.
pub fn param_ident(name: &Ident) -> Ident {
  let raw = unraw(name);
  let mut chars = raw.chars();
  let lowered: String = match chars.next() {
    Some(first) => first.to_lowercase().chain(chars).collect(),
    None => raw,
  };
  if syn::parse_str::<Ident>(&lowered).is_ok() {
    return Ident::new(&lowered, name.span());
  }
  match lowered.as_str() {
    "self" | "super" | "crate" | "_" => format_ident!("{}_", lowered, span = name.span()),
    _ => Ident::new_raw(&lowered, name.span()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use syn::parse_quote;

  #[test]
  fn param_names_lower_the_first_letter() {
    let a: Ident = parse_quote!(Alpha);
    assert_eq!(param_ident(&a).to_string(), "alpha");
    let b: Ident = parse_quote!(already);
    assert_eq!(param_ident(&b).to_string(), "already");
  }

  #[test]
  fn param_names_escape_keywords() {
    let t: Ident = parse_quote!(Type);
    assert_eq!(param_ident(&t).to_string(), "r#type");
    let s: Ident = parse_quote!(Self_);
    assert_eq!(param_ident(&s).to_string(), "self_");
    let s: Ident = Ident::new("Self", Span::call_site());
    assert_eq!(param_ident(&s).to_string(), "self_");
  }

  #[test]
  fn visibility_maps_onto_the_closed_set() {
    let cases: [(syn::Visibility, AccessibilityDecl); 5] = [
      (syn::Visibility::Inherited, AccessibilityDecl::Known(Accessibility::Private)),
      (parse_quote!(pub), AccessibilityDecl::Known(Accessibility::Public)),
      (parse_quote!(pub(crate)), AccessibilityDecl::Known(Accessibility::Internal)),
      (parse_quote!(pub(super)), AccessibilityDecl::Known(Accessibility::Protected)),
      (parse_quote!(pub(self)), AccessibilityDecl::Known(Accessibility::Private)),
    ];
    for (vis, want) in cases {
      assert_eq!(AccessibilityDecl::from_visibility(&vis), want);
    }
    let restricted: syn::Visibility = parse_quote!(pub(in crate::net));
    assert!(AccessibilityDecl::from_visibility(&restricted).known().is_none());
  }

  #[test]
  fn integer_types_resolve_from_syn() {
    let ty: syn::Type = parse_quote!(u64);
    assert_eq!(IntegerType::from_type(&ty), Some(IntegerType::U64));
    let ty: syn::Type = parse_quote!(core::primitive::u64);
    assert_eq!(IntegerType::from_type(&ty), None);
    let ty: syn::Type = parse_quote!(bool);
    assert_eq!(ValueKind::from_type(&ty), Some(ValueKind::Bool));
    let ty: syn::Type = parse_quote!(usize);
    assert_eq!(ValueKind::from_type(&ty), None);
  }

  #[test]
  fn atomics_stop_at_64_bits() {
    assert_eq!(IntegerType::U32.atomic().map(|i| i.to_string()).as_deref(), Some("AtomicU32"));
    assert_eq!(IntegerType::I8.atomic().map(|i| i.to_string()).as_deref(), Some("AtomicI8"));
    assert!(IntegerType::U128.atomic().is_none());
  }

  #[test]
  fn booleans_are_one_bit_wide() {
    let d = SubFieldDecl::new(ValueKind::Bool, 7, parse_quote!(flag));
    assert_eq!(d.effective_width(), 1);
  }
}
