use bitdivide::BitDivisible;

#[bitdivide::bit_divisible]
#[derive(Default)]
struct Data {
  #[bit_field(i32, 3, A)]
  #[bit_field(bool, _, B)]
  i: u64,
}

#[bitdivide::bit_divisible]
struct Log {
  #[shared]
  #[bit_field(u8, 3, level)]
  #[bit_field(bool, _, timestamps)]
  config: u8,
}

fn main() {
  let mut data = Data::default();
  for i in [1, 2, 4, 8, 16] {
    data.i = i;
    println!("A:{}, B:{}", data.A(), data.B());
  }

  data.set_i(1, true);
  println!("i={}", data.i);

  Log::set_config(4, true);
  println!("level={} timestamps={} config=0b{:04b}", Log::level(), Log::timestamps(), Log::config());

  for field in Data::LAYOUT {
    for s in field.sub_fields {
      println!("{}.{}: bits {}..{}", field.name, s.name, s.offset, s.end());
    }
  }
}
