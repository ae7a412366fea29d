use bitdivide_core::schema::{SubFieldDecl, ValueKind};
use proc_macro2::Span;
use syn::{Attribute, Fields, Ident, LitInt, LitStr, Result as SynResult, Token, Type, spanned::Spanned};

pub(super) const BIT_FIELD: &str = "bit_field";
pub(super) const SHARED: &str = "shared";

const MAX_WIDTH: u32 = 128;

fn is_helper(a: &Attribute) -> bool {
  a.path().is_ident(BIT_FIELD) || a.path().is_ident(SHARED)
}

// #[bit_field(<type>, <width | _>, <name | "name">)]
fn parse_bit_field(a: &Attribute) -> SynResult<SubFieldDecl> {
  a.parse_args_with(|input: syn::parse::ParseStream| {
    let ty: Type = input.parse()?;
    let kind = ValueKind::from_type(&ty).ok_or_else(|| {
      syn::Error::new(ty.span(), "sub-field type must be `bool` or one of u8/u16/u32/u64/u128/i8/i16/i32/i64/i128")
    })?;
    input.parse::<Token![,]>()?;

    let width = if input.peek(Token![_]) {
      let underscore: Token![_] = input.parse()?;
      if kind != ValueKind::Bool {
        return Err(syn::Error::new_spanned(underscore, "only `bool` sub-fields may leave the width as `_`"));
      }
      1
    } else {
      let lit: LitInt = input.parse()?;
      let width = lit.base10_parse::<u32>()?;
      if !(1..=MAX_WIDTH).contains(&width) {
        return Err(syn::Error::new(lit.span(), "sub-field width must be 1..=128"));
      }
      width
    };
    input.parse::<Token![,]>()?;

    let (name, span): (Ident, Span) = if input.peek(LitStr) {
      let lit: LitStr = input.parse()?;
      let name = syn::parse_str::<Ident>(&lit.value())
        .map_err(|_| syn::Error::new(lit.span(), "sub-field name must be a valid identifier"))?;
      (Ident::new(&name.to_string(), lit.span()), lit.span())
    } else {
      let name: Ident = input.parse()?;
      let span = name.span();
      (name, span)
    };
    // Optional trailing comma
    let _ = input.parse::<Option<Token![,]>>()?;

    let mut decl = SubFieldDecl::new(kind, width, name);
    decl.span = span;
    Ok(decl)
  })
}

/// Helper attributes found on one field.
#[derive(Default)]
pub(super) struct FieldAttrs {
  pub declarations: Vec<SubFieldDecl>,
  pub shared: Option<Span>,
}

impl FieldAttrs {
  // Collect #[bit_field] and #[shared] in source order, recording malformed ones.
  pub(super) fn parse(attrs: &[Attribute], errors: &mut Vec<syn::Error>) -> FieldAttrs {
    let mut out = FieldAttrs::default();
    for a in attrs {
      if a.path().is_ident(BIT_FIELD) {
        match parse_bit_field(a) {
          Ok(decl) => out.declarations.push(decl),
          Err(e) => errors.push(e),
        }
      } else if a.path().is_ident(SHARED) {
        if let Err(e) = a.meta.require_path_only() {
          errors.push(e);
        } else if out.shared.is_some() {
          errors.push(syn::Error::new(a.span(), "duplicate #[shared]"));
        } else {
          out.shared = Some(a.span());
        }
      }
    }
    out
  }

  /// Whether the field takes part in bit division at all.
  pub(super) fn is_backing(attrs: &[Attribute]) -> bool {
    attrs.iter().any(is_helper)
  }
}

pub(super) fn strip_helpers(attrs: &mut Vec<Attribute>) {
  attrs.retain(|a| !is_helper(a));
}

pub(super) fn strip_field_attrs(fields: &mut Fields) {
  for f in fields.iter_mut() {
    strip_helpers(&mut f.attrs);
  }
}
