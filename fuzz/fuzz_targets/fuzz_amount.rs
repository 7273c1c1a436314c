#![no_main]

use arbitrary::Arbitrary;
use etn_traits::{Amount, U256, ETN_DECIMALS};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct AmountInput {
    text: String,
    // 4 u64s make a U256
    base_parts: [u64; 4],
    places: u8,
}

fuzz_target!(|input: AmountInput| {
    // Parsing arbitrary text must never panic
    if let Ok(amount) = Amount::parse(&input.text, ETN_DECIMALS) {
        let _ = amount.to_fixed(input.places % 40);
    }

    let value = U256::from_limbs(input.base_parts);
    let amount = Amount::from_base_units(value, ETN_DECIMALS);

    // The exact decimal form parses back to the same base units
    let text = amount.to_decimal_string();
    let back = Amount::parse(&text, ETN_DECIMALS).expect("decimal string should parse");
    assert_eq!(back.base_units(), value, "decimal round-trip failed for {text}");

    // Rounded display never panics, even at the top of the range
    let _ = amount.to_fixed(input.places % 40);
    let _ = amount.checked_add(&back);
});
