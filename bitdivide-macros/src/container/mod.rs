use bitdivide_core::{Session, diagnostic, validate::validate_container};
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use syn::Item;

mod args;
mod attrs;
mod discover;

// ── driver ────────────────────────────────────────────────────────────────
fn emit_with_compile_errors(tokens: impl ToTokens, errors: Vec<syn::Error>) -> TokenStream2 {
  let es = errors.into_iter().map(|e| e.to_compile_error());
  quote! { #tokens #( #es )* }
}

pub(super) fn expand(args: TokenStream2, item: Item) -> TokenStream2 {
  use args::ContainerOpts;
  use discover::Discovered;

  let mut errors = Vec::new();
  let opts = ContainerOpts::parse(args, &mut errors);
  let discovered = match Discovered::new(item.clone(), &mut errors) {
    Ok(d) => d,
    Err(e) => {
      errors.push(e);
      return emit_with_compile_errors(item, errors);
    }
  };

  // Every backing field was malformed: the syn errors say why, plus whatever
  // is wrong with the container itself.
  if discovered.schemas.is_empty() && discovered.rejected_fields {
    let diagnostics = diagnostic::to_tokens(&validate_container(&discovered.container));
    let item = discovered.finish(&[]);
    return emit_with_compile_errors(quote! { #item #diagnostics }, errors);
  }

  let session = Session::new(opts.krate);
  let out = session.generate_container(&discovered.container, &discovered.schemas);
  let item = discovered.finish(&out.fields);
  let diagnostics = diagnostic::to_tokens(&out.diagnostics);
  let generated = out.tokens;
  emit_with_compile_errors(quote! { #item #diagnostics #generated }, errors)
}
