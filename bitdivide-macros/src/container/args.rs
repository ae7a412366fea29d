use proc_macro2::TokenStream as TokenStream2;
use syn::{Path, Result as SynResult, Token, parse_quote};

// Parsed options for #[bit_divisible(...)]
pub(super) struct ContainerOpts {
  /// Path generated code uses to reach the `bitdivide` facade.
  pub krate: Path,
}

impl Default for ContainerOpts {
  fn default() -> Self {
    Self { krate: parse_quote!(::bitdivide) }
  }
}

// Comma-separated arguments; only `crate = path` is recognised.
struct RawArgs {
  krate: Option<Path>,
}

impl syn::parse::Parse for RawArgs {
  fn parse(input: syn::parse::ParseStream) -> SynResult<Self> {
    let mut krate: Option<Path> = None;
    while !input.is_empty() {
      let lookahead = input.lookahead1();
      if lookahead.peek(Token![crate]) {
        let kw: Token![crate] = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        if krate.is_some() {
          return Err(syn::Error::new(kw.span, "duplicate `crate` argument"));
        }
        krate = Some(input.call(Path::parse_mod_style)?);
      } else {
        return Err(lookahead.error());
      }
      // Optional trailing comma
      if !input.is_empty() {
        input.parse::<Token![,]>()?;
      }
    }
    Ok(Self { krate })
  }
}

impl ContainerOpts {
  // Parse container args, recording errors and falling back to the defaults.
  pub(super) fn parse(tokens: TokenStream2, errors: &mut Vec<syn::Error>) -> ContainerOpts {
    if tokens.is_empty() {
      return ContainerOpts::default();
    }
    match syn::parse2::<RawArgs>(tokens) {
      Ok(RawArgs { krate }) => ContainerOpts { krate: krate.unwrap_or_else(|| ContainerOpts::default().krate) },
      Err(err) => {
        errors.push(err);
        ContainerOpts::default()
      }
    }
  }
}
