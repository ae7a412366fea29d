//! Lowering of synthesized accessors into Rust items.

use proc_macro2::TokenStream;
use quote::quote;
use syn::Path;

use crate::diagnostic::{Code, Diagnostic};
use crate::layout::AllocatedSubField;
use crate::schema::{Accessibility, BackingFieldSchema, ContainerInfo, ValueKind};
use crate::synth::Accessors;

/// Layout facts about one generated backing field, for the discovery metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldLayout {
  pub field: String,
  pub shared: bool,
  pub sub_fields: Vec<(String, u32, u32)>,
}

impl FieldLayout {
  pub fn new(schema: &BackingFieldSchema, allocated: &[AllocatedSubField<'_>]) -> Self {
    Self {
      field: crate::schema::unraw(&schema.field),
      shared: schema.shared,
      sub_fields: allocated.iter().map(|a| (crate::schema::unraw(&a.decl.name), a.bit_offset, a.bit_width)).collect(),
    }
  }
}

pub struct Emitter<'a> {
  krate: &'a Path,
}

impl<'a> Emitter<'a> {
  /// `krate` is the path generated code uses to reach the support declarations.
  pub fn new(krate: &'a Path) -> Self {
    Self { krate }
  }

  /// The declarations every generated container refers to. Emit once per run.
  pub fn support() -> TokenStream {
    quote! {
      /// Position of one sub-field inside its backing integer.
      #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
      pub struct SubFieldLayout {
        /// Sub-field name as declared.
        pub name: &'static str,
        /// Index of the lowest bit.
        pub offset: u32,
        /// Number of bits.
        pub width: u32,
      }

      impl SubFieldLayout {
        /// One past the highest bit.
        pub const fn end(&self) -> u32 {
          self.offset + self.width
        }

        /// Bits covered by this sub-field, in place.
        pub const fn mask(&self) -> u128 {
          if self.width >= 128 { u128::MAX } else { ((1u128 << self.width) - 1) << self.offset }
        }
      }

      /// Sub-field layout of one backing integer, in declaration order.
      #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
      pub struct BackingFieldLayout {
        /// Name of the backing field.
        pub name: &'static str,
        /// Whether the value is shared by every instance.
        pub shared: bool,
        pub sub_fields: &'static [SubFieldLayout],
      }

      impl BackingFieldLayout {
        /// Bits claimed by sub-fields, counted from bit 0.
        pub const fn used_bits(&self) -> u32 {
          let mut total = 0;
          let mut i = 0;
          while i < self.sub_fields.len() {
            total += self.sub_fields[i].width;
            i += 1;
          }
          total
        }

        pub fn sub_field(&self, name: &str) -> Option<&'static SubFieldLayout> {
          self.sub_fields.iter().find(|s| s.name == name)
        }
      }

      /// Implemented by every `#[bit_divisible]` container.
      pub trait BitDivisible {
        /// Every backing field that received accessors, in declaration order.
        const LAYOUT: &'static [BackingFieldLayout];

        fn backing_field(name: &str) -> Option<&'static BackingFieldLayout> {
          Self::LAYOUT.iter().find(|f| f.name == name)
        }
      }
    }
  }

  /// One `impl` block with the getters and the combined mutator of a backing field.
  pub fn backing_field(
    &self,
    schema: &BackingFieldSchema,
    allocated: &[AllocatedSubField<'_>],
    accessors: &Accessors,
  ) -> TokenStream {
    let container = &schema.container;
    let vis = container.accessibility.known().unwrap_or(Accessibility::Private);
    let field = &schema.field;
    let backing_ty = schema.backing;

    let (read, shared_items) = if schema.shared {
      let Some(atomic) = backing_ty.atomic() else {
        return Diagnostic::new(
          Code::UnsupportedSharedBacking,
          schema.span,
          format!("no atomic type for `{}`", backing_ty.name()),
        )
        .to_tokens();
      };
      let cell = schema.cell_name();
      let doc = format!(" Current value of the shared `{field}` bits.");
      let items = quote! {
        #[inline]
        fn #cell() -> &'static ::core::sync::atomic::#atomic {
          static CELL: ::core::sync::atomic::#atomic = ::core::sync::atomic::#atomic::new(0);
          &CELL
        }

        #[doc = #doc]
        #[inline]
        #vis fn #field() -> #backing_ty {
          Self::#cell().load(::core::sync::atomic::Ordering::Relaxed)
        }
      };
      (quote!(Self::#field()), items)
    } else {
      (quote!(self.#field), quote!())
    };

    let getters = accessors.getters.iter().map(|g| {
      let name = &g.name;
      let ret = &g.kind;
      let body = g.expr.lower(&read);
      let doc = match g.kind {
        ValueKind::Bool => format!(" Bit {} of `{field}`.", g.bit_offset),
        ValueKind::Int(_) => format!(" Bits {}..{} of `{field}`.", g.bit_offset, g.bit_offset + g.bit_width),
      };
      let receiver = if schema.shared { quote!() } else { quote!(&self) };
      quote! {
        #[doc = #doc]
        #[inline]
        #vis fn #name(#receiver) -> #ret {
          #body
        }
      }
    });

    let mutator = &accessors.mutator;
    let set = &mutator.name;
    let params = mutator.params.iter().map(|p| {
      let name = &p.name;
      let ty = &p.kind;
      quote!(#name: #ty)
    });
    let value = mutator.value.lower(&read);
    let docs = mutator_docs(schema, allocated);
    let set_fn = if schema.shared {
      let cell = schema.cell_name();
      quote! {
        #( #[doc = #docs] )*
        #[inline]
        #vis fn #set(#( #params ),*) {
          Self::#cell().store(#value, ::core::sync::atomic::Ordering::Relaxed);
        }
      }
    } else {
      quote! {
        #( #[doc = #docs] )*
        #[inline]
        #vis fn #set(&mut self, #( #params ),*) {
          self.#field = #value;
        }
      }
    };

    let ty = container.type_path();
    let (impl_generics, ty_generics, where_clause) = container.generics.split_for_impl();
    quote! {
      #[allow(non_snake_case)]
      impl #impl_generics #ty #ty_generics #where_clause {
        #shared_items
        #( #getters )*
        #set_fn
      }
    }
  }

  /// `BitDivisible` for a container, listing the backing fields that were generated.
  pub fn metadata(&self, container: &ContainerInfo, fields: &[FieldLayout]) -> TokenStream {
    let krate = self.krate;
    let entries = fields.iter().map(|f| {
      let name = &f.field;
      let shared = f.shared;
      let subs = f.sub_fields.iter().map(|(name, offset, width)| {
        quote!(#krate::SubFieldLayout { name: #name, offset: #offset, width: #width })
      });
      quote!(#krate::BackingFieldLayout { name: #name, shared: #shared, sub_fields: &[ #( #subs ),* ] })
    });
    let ty = container.type_path();
    let (impl_generics, ty_generics, where_clause) = container.generics.split_for_impl();
    quote! {
      impl #impl_generics #krate::BitDivisible for #ty #ty_generics #where_clause {
        const LAYOUT: &'static [#krate::BackingFieldLayout] = &[ #( #entries ),* ];
      }
    }
  }
}

fn mutator_docs(schema: &BackingFieldSchema, allocated: &[AllocatedSubField<'_>]) -> Vec<String> {
  let field = &schema.field;
  let mut docs = vec![
    format!(" Overwrites all of `{field}` from its sub-fields."),
    String::new(),
    " Bits outside the declared sub-fields are cleared and values are not".to_string(),
    " masked to their width.".to_string(),
    String::new(),
  ];
  docs.extend(layout_doc(schema, allocated));
  docs
}

/// Bit layout diagram as doc lines, each starting with a space.
pub fn layout_doc(schema: &BackingFieldSchema, allocated: &[AllocatedSubField<'_>]) -> Vec<String> {
  let mut docs = vec![" _Bit layout_".to_string(), String::new()];
  docs.extend(crate::diagram::render(schema.backing, allocated).lines().map(|l| format!(" {l}")));
  docs
}

/// Token output as source text.
pub fn render_source(tokens: &TokenStream) -> String {
  tokens.to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::layout::allocate;
  use crate::schema::{AccessibilityDecl, IntegerType, SubFieldDecl};
  use crate::synth::synthesize;
  use quote::{ToTokens, format_ident};
  use syn::parse_quote;

  fn data(vis: Accessibility) -> BackingFieldSchema {
    let container = ContainerInfo::new(format_ident!("Data"), AccessibilityDecl::Known(vis));
    BackingFieldSchema::new(container, format_ident!("i"), IntegerType::U64)
      .with(SubFieldDecl::new(ValueKind::Int(IntegerType::I32), 3, format_ident!("A")))
      .with(SubFieldDecl::new(ValueKind::Bool, 1, format_ident!("B")))
  }

  fn emit(schema: &BackingFieldSchema) -> syn::ItemImpl {
    let krate: Path = parse_quote!(::bitdivide);
    let allocated = allocate(&schema.declarations);
    let acc = synthesize(schema, &allocated);
    let tokens = Emitter::new(&krate).backing_field(schema, &allocated, &acc);
    syn::parse2(tokens).expect("emitted impl parses")
  }

  fn method<'a>(item: &'a syn::ItemImpl, name: &str) -> &'a syn::ImplItemFn {
    item
      .items
      .iter()
      .find_map(|i| match i {
        syn::ImplItem::Fn(f) if f.sig.ident == name => Some(f),
        _ => None,
      })
      .unwrap_or_else(|| panic!("no method `{name}`"))
  }

  fn body(f: &syn::ImplItemFn) -> String {
    let stmts = &f.block.stmts;
    quote!(#( #stmts )*).to_string()
  }

  #[test]
  fn instance_shape() {
    let item = emit(&data(Accessibility::Public));
    let a = method(&item, "A");
    assert!(matches!(a.vis, syn::Visibility::Public(_)));
    assert_eq!(a.sig.inputs.len(), 1);
    assert_eq!(body(a), quote!((self.i & 0b111) as i32).to_string());
    assert_eq!(body(method(&item, "B")), quote!(((self.i >> 3) & 0b1) == 1).to_string());

    let set = method(&item, "set_i");
    let inputs = &set.sig.inputs;
    assert_eq!(quote!(#inputs).to_string(), quote!(&mut self, a: i32, b: bool).to_string());
    assert_eq!(body(set), quote!(self.i = (a as u64) | (u64::from(b) << 3);).to_string());
  }

  #[test]
  fn shared_shape_is_uniform() {
    let item = emit(&data(Accessibility::Internal).shared(true));
    for f in item.items.iter().filter_map(|i| match i {
      syn::ImplItem::Fn(f) => Some(f),
      _ => None,
    }) {
      assert!(f.sig.receiver().is_none(), "`{}` takes self", f.sig.ident);
    }
    assert_eq!(body(method(&item, "A")), quote!((Self::i() & 0b111) as i32).to_string());
    assert!(body(method(&item, "set_i")).contains("store"));
    assert!(body(method(&item, "i")).contains("load"));
    let raw = method(&item, "i");
    assert_eq!(raw.vis.to_token_stream().to_string(), "pub (crate)");
  }

  #[test]
  fn namespace_qualifies_the_self_type() {
    let mut schema = data(Accessibility::Private);
    schema.container.namespace = Some(parse_quote!(crate::net::header));
    let item = emit(&schema);
    let self_ty = &item.self_ty;
    assert_eq!(quote!(#self_ty).to_string(), quote!(crate::net::header::Data).to_string());
    assert!(matches!(method(&item, "A").vis, syn::Visibility::Inherited));
  }

  #[test]
  fn generics_are_threaded_through() {
    let mut schema = data(Accessibility::Public);
    schema.container.generics = parse_quote!(<T: Copy>);
    let item = emit(&schema);
    let self_ty = &item.self_ty;
    assert_eq!(quote!(#self_ty).to_string(), quote!(Data<T>).to_string());
    assert_eq!(item.generics.params.len(), 1);
  }

  #[test]
  fn metadata_lists_allocated_fields() {
    let krate: Path = parse_quote!(::bitdivide);
    let schema = data(Accessibility::Public);
    let layout = FieldLayout::new(&schema, &allocate(&schema.declarations));
    assert_eq!(layout.sub_fields, vec![("A".to_string(), 0, 3), ("B".to_string(), 3, 1)]);
    let tokens = Emitter::new(&krate).metadata(&schema.container, &[layout]);
    let item: syn::ItemImpl = syn::parse2(tokens).expect("metadata parses");
    let trait_path = item.trait_.as_ref().map(|(_, p, _)| quote!(#p).to_string());
    assert_eq!(trait_path, Some(quote!(::bitdivide::BitDivisible).to_string()));
  }

  #[test]
  fn support_parses_as_items() {
    let file: syn::File = syn::parse2(Emitter::support()).expect("support parses");
    let names: Vec<String> = file
      .items
      .iter()
      .filter_map(|i| match i {
        syn::Item::Struct(s) => Some(s.ident.to_string()),
        syn::Item::Trait(t) => Some(t.ident.to_string()),
        _ => None,
      })
      .collect();
    assert_eq!(names, ["SubFieldLayout", "BackingFieldLayout", "BitDivisible"]);
  }

  #[test]
  fn mutator_docs_carry_the_diagram() {
    let schema = data(Accessibility::Public);
    let docs = mutator_docs(&schema, &allocate(&schema.declarations));
    assert!(docs.iter().any(|l| l.contains("A = A: i32, bits 0..3")));
    assert!(docs.iter().all(|l| l.is_empty() || l.starts_with(' ')));
  }
}
