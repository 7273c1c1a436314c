#![no_main]

use etn_traits::parse_address;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(address) = parse_address(data) {
        let checksummed = address.to_string();
        assert_eq!(parse_address(&checksummed).ok(), Some(address));
    }
});
