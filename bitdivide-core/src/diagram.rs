//! Text diagram of a backing integer's layout, appended to generated docs.
//!
//! Bytes are drawn most-significant first, two per row. Each sub-field gets a
//! one-letter tag, preferring a letter from its own name; unused bits show as
//! `◦`. A legend maps tags back to sub-field names.

use core::fmt::Write;

use crate::layout::AllocatedSubField;
use crate::schema::{IntegerType, ValueKind};

const BYTES_PER_ROW: usize = 2;
const UNUSED: char = '◦';
const PALETTE: &[char] = &[
  'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
  'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

fn take(used: &mut [bool; 128], c: char) -> bool {
  let i = c as usize;
  i < 128 && !core::mem::replace(&mut used[i], true)
}

// Ambiguous glyphs (I, L, O) are skipped.
fn pick(name: &str, used: &mut [bool; 128]) -> char {
  name
    .chars()
    .filter(|c| c.is_ascii_alphabetic())
    .map(|c| c.to_ascii_uppercase())
    .find(|&c| !matches!(c, 'I' | 'L' | 'O') && take(used, c))
    .or_else(|| PALETTE.iter().copied().find(|&c| take(used, c)))
    .unwrap_or('?')
}

/// Render the layout as a fenced Markdown block.
pub fn render(backing: IntegerType, subs: &[AllocatedSubField<'_>]) -> String {
  let total = backing.bits() as usize;
  let nbytes = total / 8;
  let mut cell = vec![UNUSED; total];
  let mut used = [false; 128];
  let mut legend = Vec::with_capacity(subs.len());

  for sub in subs {
    let tag = pick(&sub.decl.name.to_string(), &mut used);
    for bit in sub.bit_offset..sub.end() {
      if let Some(c) = cell.get_mut(bit as usize) {
        *c = tag;
      }
    }
    legend.push((tag, sub));
  }

  let w = (total - 1).to_string().len().max(2);
  let mut out = String::from("```text\n");
  for hi in (0..nbytes).rev().step_by(BYTES_PER_ROW) {
    let row: Vec<usize> = (0..BYTES_PER_ROW).filter_map(|k| hi.checked_sub(k)).collect();
    for line in 0..2 {
      for (n, &b) in row.iter().enumerate() {
        if n > 0 {
          out.push_str("   ");
        }
        for bit in (0..8).rev() {
          let g = b * 8 + bit;
          let _ = match line {
            0 => write!(out, "{:>w$}", format!("{g:02}")),
            _ => write!(out, "{:>w$}", cell[g]),
          };
          if bit != 0 {
            out.push(' ');
          }
        }
      }
      out.push('\n');
    }
  }
  for (tag, sub) in legend {
    let ty = match sub.kind() {
      ValueKind::Bool => "bool".to_string(),
      ValueKind::Int(t) => t.name().to_string(),
    };
    let _ = writeln!(out, "{tag} = {}: {ty}, bits {}..{}", sub.decl.name, sub.bit_offset, sub.end());
  }
  out.push_str("```");
  out
}
