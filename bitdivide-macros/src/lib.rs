//! Procedural macros for `bitdivide`. Depend on the `bitdivide` crate instead:
//! it re-exports [`bit_divisible`] and carries the support declarations the
//! generated code refers to.

extern crate proc_macro;
use proc_macro::TokenStream;

mod container;

/// Split integer fields of a struct into typed sub-fields.
///
/// See the `bitdivide` crate for the attribute grammar.
#[proc_macro_attribute]
pub fn bit_divisible(args: TokenStream, input: TokenStream) -> TokenStream {
  container::expand(args.into(), syn::parse_macro_input!(input as syn::Item)).into()
}

/// Expands to `SubFieldLayout`, `BackingFieldLayout` and `BitDivisible`.
///
/// Invoked once, by the `bitdivide` crate root.
#[doc(hidden)]
#[proc_macro]
pub fn support(input: TokenStream) -> TokenStream {
  let input = proc_macro2::TokenStream::from(input);
  if !input.is_empty() {
    return syn::Error::new_spanned(input, "support!() takes no arguments").to_compile_error().into();
  }
  let session = bitdivide_core::Session::new(syn::parse_quote!(crate));
  session.take_support().unwrap_or_default().into()
}
