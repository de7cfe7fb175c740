#![no_main]

use {
  hubtypes::{Coin, Coins},
  libfuzzer_sys::fuzz_target,
};

fuzz_target!(|input: &str| {
  if let Ok(coin) = input.parse::<Coin>()
    && !input.trim().starts_with('{')
  {
    assert_eq!(coin.to_string().parse::<Coin>().unwrap(), coin);
  }

  let _ = input.parse::<Coins>();
});
