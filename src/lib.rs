//! bitdivide — typed sub-fields over a plain integer field
//!
//! Attach `#[bit_divisible]` to a struct and describe, field by field, how an
//! integer is divided into sub-fields. The macro generates one getter per
//! sub-field and a single combined setter per backing field. You keep the
//! struct and its integer; the generated code is straight-line shifts and
//! masks, and is `no_std`.
//!
//! - `#[bit_field(T, W, Name)]` on an integer field declares the next
//!   sub-field: `W` bits of value type `T`, read back through `fn Name()`.
//!   - `T` is `bool` or one of `u8 u16 u32 u64 u128 i8 i16 i32 i64 i128`.
//!   - `W` may be `_` for `bool` (always one bit).
//!   - `Name` is an identifier or a string literal holding one.
//!   - Repeat the attribute; sub-fields are packed from bit 0 upwards in the
//!     order written.
//! - `#[shared]` moves the backing field out of the struct into one static
//!   atomic cell used by every instance. Getters and the setter become
//!   associated functions and a raw getter `fn <field>()` is added.
//! - `#[bit_divisible(crate = path)]` names this crate when it is re-exported
//!   under another path.
//!
//! Generated members
//! - Getter per sub-field: `((field >> offset) & mask) as T`, or
//!   `((field >> offset) & 0b1) == 1` for `bool`.
//! - `set_<field>(..)` takes every sub-field in declaration order and
//!   overwrites the whole backing integer: bits outside the declared
//!   sub-fields are cleared and values are not masked to their width.
//! - Every member carries the struct's visibility (private, `pub(super)`,
//!   `pub(crate)` or `pub`).
//! - `impl BitDivisible` exposes the resulting layout as data, see
//!   [`BitDivisible::LAYOUT`].
//!
//! Signed sub-fields
//! - Values are read back as the raw bit pattern, without sign extension:
//!   `0b111` in a 3-bit `i32` sub-field reads back as `7`, not `-1`.
//! - The setter does not mask either, so a negative value sets every bit
//!   above its sub-field. Pass values that fit their width.
//!
//! Example
//! ```
//! #[bitdivide::bit_divisible]
//! #[derive(Default)]
//! pub struct Data {
//!   #[bit_field(i32, 3, A)]
//!   #[bit_field(bool, _, B)]
//!   i: u64,
//! }
//!
//! let mut d = Data { i: 0b1101 };
//! assert_eq!(d.A(), 5);
//! assert!(d.B());
//!
//! d.set_i(2, true);
//! assert_eq!(d.A(), 2);
//! assert!(d.B());
//! ```
//!
//! Compile-time checks
//!
//! Every check reports a code and leaves the other backing fields of the
//! struct alone.
//!
//! - `E0001` the struct's visibility is not one of the four above:
//! ```compile_fail
//! mod outer {
//!   pub mod inner {
//!     #[bitdivide::bit_divisible]
//!     pub(in crate::outer) struct Data {
//!       #[bit_field(u8, 4, low)]
//!       i: u8,
//!     }
//!   }
//! }
//! # fn main() {}
//! ```
//! - `E0002` the item cannot receive members by name:
//! ```compile_fail
//! #[bitdivide::bit_divisible]
//! struct Pair(#[bit_field(u8, 4, low)] u8);
//! # fn main() {}
//! ```
//! - `E0003` the sub-fields do not fit the backing integer:
//! ```compile_fail
//! #[bitdivide::bit_divisible]
//! struct Data {
//!   #[bit_field(u8, 6, a)]
//!   #[bit_field(u8, 3, b)]
//!   i: u8,
//! }
//! # fn main() {}
//! ```
//! - `E0004` two sub-fields, or their setter parameters, share a name:
//! ```compile_fail
//! #[bitdivide::bit_divisible]
//! struct Data {
//!   #[bit_field(u8, 2, Mode)]
//!   #[bit_field(u8, 2, mode)]
//!   i: u8,
//! }
//! # fn main() {}
//! ```
//! - `E0005` a `#[shared]` backing field is 128 bits wide.
//! - `E0006` an integer sub-field is 0 bits wide, or wider than its value type:
//! ```compile_fail
//! #[bitdivide::bit_divisible]
//! struct Data {
//!   #[bit_field(u8, 9, wide)]
//!   i: u16,
//! }
//! # fn main() {}
//! ```
//! - `W0001` (warning) a backing field without sub-fields, or a struct without
//!   backing fields. Nothing is generated for it.
#![cfg_attr(not(test), no_std)]

extern crate self as bitdivide;

pub use bitdivide_macros::bit_divisible;

bitdivide_macros::support!();
