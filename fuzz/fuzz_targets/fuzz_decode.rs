#![no_main]

use libfuzzer_sys::fuzz_target;
use mep2::{decode_string, encode_string};

fuzz_target!(|data: &[u8]| {
    if let Ok(decoded) = decode_string(data) {
        // Whatever decodes must re-encode without panicking
        let _ = encode_string(decoded.as_bytes());
    }
});
