use crate::schema::{SubFieldDecl, ValueKind};

/// A declaration with its position inside the backing integer.
#[derive(Copy, Clone, Debug)]
pub struct AllocatedSubField<'a> {
  pub decl: &'a SubFieldDecl,
  pub bit_offset: u32,
  pub bit_width: u32,
}

impl AllocatedSubField<'_> {
  /// One past the highest bit this sub-field occupies.
  pub fn end(&self) -> u32 {
    self.bit_offset.saturating_add(self.bit_width)
  }

  pub fn kind(&self) -> ValueKind {
    self.decl.kind
  }
}

/// Pack declarations from bit 0 upwards, in declaration order.
///
/// Each sub-field starts where the previous one ended; booleans take one bit
/// whatever width they declare. The result is total: fitting the backing
/// integer is checked by [`crate::validate`], not here.
pub fn allocate(declarations: &[SubFieldDecl]) -> Vec<AllocatedSubField<'_>> {
  let mut cursor: u32 = 0;
  let mut out = Vec::with_capacity(declarations.len());
  for decl in declarations {
    let width = decl.effective_width();
    out.push(AllocatedSubField { decl, bit_offset: cursor, bit_width: width });
    cursor = cursor.saturating_add(width);
  }
  out
}

/// Bits consumed by all declarations together.
pub fn total_width(declarations: &[SubFieldDecl]) -> u64 {
  declarations.iter().map(|d| d.effective_width() as u64).sum()
}
