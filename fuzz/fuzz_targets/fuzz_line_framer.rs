#![no_main]

use hwscan_core::protocol::LineFramer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut framer = LineFramer::new();
    for chunk in data.chunks(7) {
        framer.push(chunk);
        while let Some(line) = framer.next_line() {
            assert!(!line.contains('\n'));
        }
        let _ = framer.take_login_prompt();
    }
});
