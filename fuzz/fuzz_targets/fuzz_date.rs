#![no_main]

use libfuzzer_sys::fuzz_target;
use mep2::Date;

fuzz_target!(|data: &[u8]| {
    if data.len() < 29 {
        return;
    }

    let Ok(line) = std::str::from_utf8(&data[..29]) else {
        return;
    };

    if let Ok(date) = Date::parse(line) {
        let _ = date.to_gmt_string();
        let _ = date.to_orig_string();
    }
});
