#![no_main]

use hwscan_core::Address;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(address) = Address::parse(text) {
        let canonical = address.to_string();
        assert_eq!(Address::parse(&canonical), Ok(address));
        assert_eq!(Address::from_value(address.depth(), address.value()), Some(address));
    }
    let _ = Address::parse_lenient(text);
});
