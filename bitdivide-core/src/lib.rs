//! bitdivide-core — the schema compiler behind `#[bit_divisible]`
//!
//! Takes a declaration like "this `u64` holds `A` in its low 3 bits and `B` in
//! the next one" and produces Rust accessors for it:
//!
//! - [`schema`]: the input model, one [`BackingFieldSchema`] per backing field.
//! - [`layout`]: sequential bit allocation in declaration order.
//! - [`synth`]: extraction and contribution rules as [`expr::Expr`] trees, and
//!   the combined full-overwrite mutator.
//! - [`validate`]: structural checks, reported as [`Diagnostic`]s.
//! - [`emit`]: lowering to tokens, the shared support declarations and the
//!   per-container `BitDivisible` metadata.
//! - [`session`]: the pipeline for one generation run.
//!
//! The crate knows nothing about how declarations are discovered. The
//! `bitdivide-macros` crate builds schemas from attributes; other tools can
//! build them directly:
//!
//! ```
//! use bitdivide_core::{Session, schema::*};
//! use quote::format_ident;
//!
//! let container = ContainerInfo::new(format_ident!("Data"), AccessibilityDecl::Known(Accessibility::Public));
//! let schema = BackingFieldSchema::new(container, format_ident!("i"), IntegerType::U64)
//!   .with(SubFieldDecl::new(ValueKind::Int(IntegerType::I32), 3, format_ident!("A")))
//!   .with(SubFieldDecl::new(ValueKind::Bool, 1, format_ident!("B")));
//!
//! let session = Session::new(syn::parse_quote!(::bitdivide));
//! let out = session.generate(&schema).expect("valid schema");
//! let source = bitdivide_core::emit::render_source(&out.tokens);
//! assert!(source.contains("fn set_i"));
//! ```

pub mod diagnostic;
mod diagram;
pub mod emit;
pub mod expr;
pub mod layout;
pub mod schema;
pub mod session;
pub mod synth;
pub mod validate;

pub use diagnostic::{Code, Diagnostic, Severity};
pub use schema::BackingFieldSchema;
pub use session::{ContainerOutput, FieldOutput, Run, Session, SupportOnce};
