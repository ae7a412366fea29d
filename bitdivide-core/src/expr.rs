//! Expression trees for extraction and contribution rules.
//!
//! Synthesis builds these; [`Expr::lower`] turns them into Rust tokens and
//! [`Expr::eval`] interprets them, so the arithmetic can be checked without
//! compiling generated code.

use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::quote;

use crate::schema::{IntegerType, ones};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
  /// Current value of the backing integer.
  Backing,
  /// A parameter of the combined mutator.
  Param(Ident),
  Shr(Box<Expr>, u32),
  Shl(Box<Expr>, u32),
  /// `& 0b1..1` with `width` ones.
  Mask(Box<Expr>, u32),
  Cast(Box<Expr>, IntegerType),
  /// `bool` widened to an integer (0 or 1).
  BoolToInt(Box<Expr>, IntegerType),
  /// `== 1`
  BitTest(Box<Expr>),
  Or(Vec<Expr>),
}

impl Expr {
  pub fn param(ident: Ident) -> Expr {
    Expr::Param(ident)
  }

  /// Right shift; a zero shift is left out.
  pub fn shr(self, by: u32) -> Expr {
    if by == 0 { self } else { Expr::Shr(Box::new(self), by) }
  }

  /// Left shift; a zero shift is left out.
  pub fn shl(self, by: u32) -> Expr {
    if by == 0 { self } else { Expr::Shl(Box::new(self), by) }
  }

  pub fn mask(self, width: u32) -> Expr {
    Expr::Mask(Box::new(self), width)
  }

  pub fn cast(self, ty: IntegerType) -> Expr {
    Expr::Cast(Box::new(self), ty)
  }

  pub fn bool_to_int(self, ty: IntegerType) -> Expr {
    Expr::BoolToInt(Box::new(self), ty)
  }

  pub fn bit_test(self) -> Expr {
    Expr::BitTest(Box::new(self))
  }

  pub fn or(terms: Vec<Expr>) -> Expr {
    Expr::Or(terms)
  }

  fn is_atom(&self) -> bool {
    matches!(self, Expr::Backing | Expr::Param(_))
  }

  /// Lower to tokens, reading the backing integer through `backing`.
  ///
  /// Nested compound expressions are parenthesised; the outermost one is not.
  pub fn lower(&self, backing: &TokenStream) -> TokenStream {
    match self {
      Expr::Backing => backing.clone(),
      Expr::Param(id) => quote!(#id),
      Expr::Shr(e, by) => {
        let e = e.operand(backing);
        let by = Literal::u32_unsuffixed(*by);
        quote!(#e >> #by)
      }
      Expr::Shl(e, by) => {
        let e = e.operand(backing);
        let by = Literal::u32_unsuffixed(*by);
        quote!(#e << #by)
      }
      Expr::Mask(e, width) => {
        let e = e.operand(backing);
        let mask = mask_literal(*width);
        quote!(#e & #mask)
      }
      Expr::Cast(e, ty) => {
        let e = e.operand(backing);
        quote!(#e as #ty)
      }
      Expr::BoolToInt(e, ty) => {
        let e = e.lower(backing);
        quote!(#ty::from(#e))
      }
      Expr::BitTest(e) => {
        let e = e.operand(backing);
        quote!(#e == 1)
      }
      Expr::Or(terms) => {
        match terms.as_slice() {
          [] => return quote!(0),
          [only] => return only.lower(backing),
          _ => {}
        }
        let terms = terms.iter().map(|t| t.operand(backing));
        quote!(#( #terms )|*)
      }
    }
  }

  fn operand(&self, backing: &TokenStream) -> TokenStream {
    let inner = self.lower(backing);
    if self.is_atom() || matches!(self, Expr::BoolToInt(..)) { inner } else { quote!((#inner)) }
  }

  /// Interpret the tree over unsigned bit patterns.
  ///
  /// Booleans are 0 or 1. Values are not sign-extended: a cast keeps the low
  /// bits of the target type, which is exact for every non-negative value.
  pub fn eval(&self, env: &Env<'_>) -> u128 {
    match self {
      Expr::Backing => env.backing & ones(env.backing_ty.bits()),
      Expr::Param(id) => env.param(id),
      Expr::Shr(e, by) => e.eval(env).checked_shr(*by).unwrap_or(0),
      Expr::Shl(e, by) => e.eval(env).checked_shl(*by).unwrap_or(0) & ones(env.backing_ty.bits()),
      Expr::Mask(e, width) => e.eval(env) & ones(*width),
      Expr::Cast(e, ty) => e.eval(env) & ones(ty.bits()),
      Expr::BoolToInt(e, _) => (e.eval(env) != 0) as u128,
      Expr::BitTest(e) => (e.eval(env) == 1) as u128,
      Expr::Or(terms) => terms.iter().fold(0, |acc, t| acc | t.eval(env)),
    }
  }
}

fn mask_literal(width: u32) -> Literal {
  if width == 0 {
    return Literal::u8_unsuffixed(0);
  }
  let digits = "1".repeat(width as usize);
  syn::LitInt::new(&format!("0b{digits}"), Span::call_site()).token()
}

/// Bindings for [`Expr::eval`].
#[derive(Clone, Debug)]
pub struct Env<'a> {
  pub backing: u128,
  pub backing_ty: IntegerType,
  pub params: &'a [(String, u128)],
}

impl<'a> Env<'a> {
  pub fn new(backing_ty: IntegerType, backing: u128, params: &'a [(String, u128)]) -> Self {
    Self { backing, backing_ty, params }
  }

  fn param(&self, id: &Ident) -> u128 {
    let name = id.to_string();
    self.params.iter().find(|(n, _)| *n == name).map(|(_, v)| *v).unwrap_or(0)
  }
}
