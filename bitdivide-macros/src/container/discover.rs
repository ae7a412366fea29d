use bitdivide_core::FieldOutput;
use bitdivide_core::schema::{AccessibilityDecl, BackingFieldSchema, ContainerInfo, IntegerType};
use syn::{Fields, Item, parse_quote, spanned::Spanned};

use super::attrs::{FieldAttrs, strip_field_attrs, strip_helpers};

/// Container and backing-field schemas read off an annotated item, plus the
/// item itself with the helper attributes removed.
pub(super) struct Discovered {
  pub container: ContainerInfo,
  pub schemas: Vec<BackingFieldSchema>,
  /// Some field carried helpers but was rejected before it became a schema.
  pub rejected_fields: bool,
  item: Item,
}

impl Discovered {
  pub(super) fn new(item: Item, errors: &mut Vec<syn::Error>) -> syn::Result<Discovered> {
    match item {
      Item::Struct(mut s) => {
        let mut container = ContainerInfo::new(s.ident.clone(), AccessibilityDecl::from_visibility(&s.vis));
        container.generics = s.generics.clone();
        container.extensible = matches!(s.fields, Fields::Named(_));

        let mut schemas = Vec::new();
        let mut rejected_fields = false;
        if let Fields::Named(named) = &mut s.fields {
          let mut kept = syn::punctuated::Punctuated::new();
          for mut field in std::mem::take(&mut named.named) {
            if !FieldAttrs::is_backing(&field.attrs) {
              kept.push(field);
              continue;
            }
            let before = errors.len();
            let attrs = FieldAttrs::parse(&field.attrs, errors);
            let backing = IntegerType::from_type(&field.ty);
            if backing.is_none() {
              errors.push(syn::Error::new(
                field.ty.span(),
                "backing field must be one of u8/u16/u32/u64/u128/i8/i16/i32/i64/i128",
              ));
            }
            let shared = attrs.shared.is_some();
            match (backing, &field.ident) {
              (Some(backing), Some(ident)) if errors.len() == before => {
                let schema = attrs
                  .declarations
                  .into_iter()
                  .fold(BackingFieldSchema::new(container.clone(), ident.clone(), backing).shared(shared), |s, d| {
                    s.with(d)
                  });
                schemas.push(schema);
              }
              _ => rejected_fields = true,
            }
            // Shared bits live in a static cell, not in the instance.
            if !shared {
              strip_helpers(&mut field.attrs);
              kept.push(field);
            }
          }
          named.named = kept;
        } else {
          strip_field_attrs(&mut s.fields);
        }
        Ok(Discovered { container, schemas, rejected_fields, item: Item::Struct(s) })
      }
      Item::Enum(mut e) => {
        let container = not_extensible(&e.ident, &e.vis);
        for v in e.variants.iter_mut() {
          strip_field_attrs(&mut v.fields);
        }
        Ok(Discovered { container, schemas: Vec::new(), rejected_fields: false, item: Item::Enum(e) })
      }
      Item::Union(mut u) => {
        let container = not_extensible(&u.ident, &u.vis);
        for f in u.fields.named.iter_mut() {
          strip_helpers(&mut f.attrs);
        }
        Ok(Discovered { container, schemas: Vec::new(), rejected_fields: false, item: Item::Union(u) })
      }
      other => Err(syn::Error::new(other.span(), "#[bit_divisible] can only be applied to a struct")),
    }
  }

  /// The cleaned item, with each generated instance field documenting its bit layout.
  pub(super) fn finish(self, generated: &[FieldOutput]) -> Item {
    let mut item = self.item;
    if let Item::Struct(s) = &mut item {
      for field in s.fields.iter_mut() {
        let Some(out) = generated.iter().find(|g| field.ident.as_ref() == Some(&g.field)) else {
          continue;
        };
        if field.attrs.iter().any(|a| a.path().is_ident("doc")) {
          field.attrs.push(parse_quote!(#[doc = ""]));
        }
        for line in &out.layout_doc {
          field.attrs.push(parse_quote!(#[doc = #line]));
        }
      }
    }
    item
  }
}

fn not_extensible(name: &syn::Ident, vis: &syn::Visibility) -> ContainerInfo {
  let mut container = ContainerInfo::new(name.clone(), AccessibilityDecl::from_visibility(vis));
  container.extensible = false;
  container
}
