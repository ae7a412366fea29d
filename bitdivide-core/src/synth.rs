//! Accessor synthesis: extraction rules, contribution rules and the combined mutator.

use proc_macro2::Ident;

use crate::expr::Expr;
use crate::layout::AllocatedSubField;
use crate::schema::{BackingFieldSchema, IntegerType, ValueKind};

/// Read-only view of one sub-field.
#[derive(Clone, Debug)]
pub struct Getter {
  pub name: Ident,
  pub kind: ValueKind,
  pub bit_offset: u32,
  pub bit_width: u32,
  pub expr: Expr,
}

#[derive(Clone, Debug)]
pub struct Param {
  pub name: Ident,
  pub kind: ValueKind,
}

/// The operation that replaces the whole backing value from every sub-field.
#[derive(Clone, Debug)]
pub struct Mutator {
  pub name: Ident,
  pub params: Vec<Param>,
  /// New backing value. Bits outside the declared sub-fields are zero.
  pub value: Expr,
}

#[derive(Clone, Debug)]
pub struct Accessors {
  pub getters: Vec<Getter>,
  pub mutator: Mutator,
}

/// How a sub-field is read out of the backing integer.
///
/// One-bit booleans are tested against 1; everything else is shifted down,
/// masked to its width and cast. A mask as wide as the backing integer is a
/// no-op and is left out.
pub fn extraction(sub: &AllocatedSubField<'_>, backing: IntegerType) -> Expr {
  let shifted = Expr::Backing.shr(sub.bit_offset);
  let masked = if sub.bit_width < backing.bits() { shifted.mask(sub.bit_width) } else { shifted };
  match sub.kind() {
    ValueKind::Bool => masked.bit_test(),
    ValueKind::Int(ty) => masked.cast(ty),
  }
}

/// How a sub-field's parameter lands in the new backing value.
pub fn contribution(sub: &AllocatedSubField<'_>, backing: IntegerType) -> Expr {
  let value = Expr::param(sub.decl.param_name());
  let widened = match sub.kind() {
    ValueKind::Bool => value.bool_to_int(backing),
    ValueKind::Int(_) => value.cast(backing),
  };
  widened.shl(sub.bit_offset)
}

pub fn synthesize(schema: &BackingFieldSchema, allocated: &[AllocatedSubField<'_>]) -> Accessors {
  let backing = schema.backing;
  let getters = allocated
    .iter()
    .map(|sub| Getter {
      name: sub.decl.name.clone(),
      kind: sub.kind(),
      bit_offset: sub.bit_offset,
      bit_width: sub.bit_width,
      expr: extraction(sub, backing),
    })
    .collect();
  let params = allocated.iter().map(|sub| Param { name: sub.decl.param_name(), kind: sub.kind() }).collect();
  let value = Expr::or(allocated.iter().map(|sub| contribution(sub, backing)).collect());
  Accessors { getters, mutator: Mutator { name: schema.mutator_name(), params, value } }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expr::Env;
  use crate::layout::allocate;
  use crate::schema::{AccessibilityDecl, Accessibility, ContainerInfo, SubFieldDecl, ones};
  use quote::format_ident;

  fn schema(backing: IntegerType, decls: &[(ValueKind, u32, &str)]) -> BackingFieldSchema {
    let container = ContainerInfo::new(format_ident!("Data"), AccessibilityDecl::Known(Accessibility::Public));
    decls.iter().fold(BackingFieldSchema::new(container, format_ident!("i"), backing), |s, (k, w, n)| {
      s.with(SubFieldDecl::new(*k, *w, format_ident!("{}", n)))
    })
  }

  fn set(acc: &Accessors, backing: IntegerType, values: &[u128]) -> u128 {
    let params: Vec<(String, u128)> =
      acc.mutator.params.iter().zip(values).map(|(p, v)| (p.name.to_string(), *v)).collect();
    acc.mutator.value.eval(&Env::new(backing, 0, &params))
  }

  fn get(acc: &Accessors, backing: IntegerType, raw: u128) -> Vec<u128> {
    acc.getters.iter().map(|g| g.expr.eval(&Env::new(backing, raw, &[]))).collect()
  }

  #[test]
  fn worked_example() {
    let s = schema(IntegerType::U64, &[(ValueKind::Int(IntegerType::I32), 3, "A"), (ValueKind::Bool, 0, "B")]);
    let allocated = allocate(&s.declarations);
    let acc = synthesize(&s, &allocated);

    assert_eq!(get(&acc, IntegerType::U64, 0b1101), vec![5, 1]);
    assert_eq!(set(&acc, IntegerType::U64, &[2, 1]), 10);
    assert_eq!(acc.mutator.name.to_string(), "set_i");
    let names: Vec<_> = acc.mutator.params.iter().map(|p| p.name.to_string()).collect();
    assert_eq!(names, ["a", "b"]);
  }

  #[test]
  fn extraction_inverts_the_mutator() {
    let layouts: [(IntegerType, &[(ValueKind, u32, &str)]); 3] = [
      (IntegerType::U8, &[(ValueKind::Bool, 1, "on"), (ValueKind::Int(IntegerType::U8), 4, "level"), (ValueKind::Int(IntegerType::U8), 3, "mode")]),
      (IntegerType::U32, &[(ValueKind::Int(IntegerType::U16), 12, "id"), (ValueKind::Bool, 1, "ack"), (ValueKind::Int(IntegerType::U32), 19, "payload")]),
      (IntegerType::U128, &[(ValueKind::Int(IntegerType::U64), 64, "lo"), (ValueKind::Int(IntegerType::U64), 63, "hi"), (ValueKind::Bool, 1, "tag")]),
    ];
    for (backing, decls) in layouts {
      let s = schema(backing, decls);
      let allocated = allocate(&s.declarations);
      let acc = synthesize(&s, &allocated);
      // extremes and an alternating pattern per sub-field
      for pick in 0..3u32 {
        let values: Vec<u128> = allocated
          .iter()
          .map(|a| match pick {
            0 => 0,
            1 => ones(a.bit_width),
            _ => 0x5555_5555_5555_5555_5555_5555_5555_5555 & ones(a.bit_width),
          })
          .collect();
        let raw = set(&acc, backing, &values);
        assert_eq!(get(&acc, backing, raw), values, "{backing:?} pick {pick}");
      }
    }
  }

  #[test]
  fn mutator_overwrites_instead_of_merging() {
    let s = schema(IntegerType::U16, &[(ValueKind::Int(IntegerType::U8), 4, "lo"), (ValueKind::Bool, 1, "flag")]);
    let allocated = allocate(&s.declarations);
    let acc = synthesize(&s, &allocated);

    let params = [("lo".to_string(), 0b1010), ("flag".to_string(), 1)];
    let first = acc.mutator.value.eval(&Env::new(IntegerType::U16, 0xFFFF, &params));
    let params = [("lo".to_string(), 0b0001), ("flag".to_string(), 0)];
    let second = acc.mutator.value.eval(&Env::new(IntegerType::U16, first, &params));
    assert_eq!(second, 0b0001);
    // bits above the declared sub-fields are cleared regardless of the old value
    assert_eq!(first, 0b1_1010);
  }

  #[test]
  fn full_width_fields_skip_the_mask() {
    let s = schema(IntegerType::U8, &[(ValueKind::Int(IntegerType::U8), 8, "all")]);
    let allocated = allocate(&s.declarations);
    let acc = synthesize(&s, &allocated);
    assert_eq!(acc.getters[0].expr, Expr::Backing.cast(IntegerType::U8));
  }

  #[test]
  fn shared_and_instance_share_the_math() {
    let decls = [(ValueKind::Int(IntegerType::U8), 5, "x"), (ValueKind::Bool, 1, "y")];
    let instance = schema(IntegerType::U32, &decls);
    let shared = schema(IntegerType::U32, &decls).shared(true);
    let a = synthesize(&instance, &allocate(&instance.declarations));
    let b = synthesize(&shared, &allocate(&shared.declarations));
    assert_eq!(a.mutator.value, b.mutator.value);
    for (ga, gb) in a.getters.iter().zip(&b.getters) {
      assert_eq!(ga.expr, gb.expr);
    }
  }
}
