#![no_main]

use etn_traits::PricePoint;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Untrusted price service bodies must decode or fail cleanly
    let _ = serde_json::from_slice::<Vec<PricePoint>>(data);
});
