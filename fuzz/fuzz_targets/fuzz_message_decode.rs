#![no_main]

use hwscan_core::protocol::{Message, Request};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    if let Ok(message) = Message::decode(&text) {
        let _ = message.message_type();
        let _ = message.to_string();
    }
    if let Ok(request) = Request::decode(&text) {
        assert_eq!(Request::decode(&request.to_string()), Ok(request));
    }
});
