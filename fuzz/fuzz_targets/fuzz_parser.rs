#![no_main]

use libfuzzer_sys::fuzz_target;
use mep2::PduParser;

// Split the input at line terminators the way the transport loop would and
// feed each wire line to the parser. Any Err is a valid outcome; panics and
// memory unsafety are what we hunt.
fuzz_target!(|data: &[u8]| {
    let mut parser = PduParser::new();

    let mut rest = data;
    while !rest.is_empty() {
        let Some(cr) = rest.iter().position(|&b| b == b'\r' || b == b'\n') else {
            break;
        };

        let mut len = cr + 1;
        if rest.len() > len && rest[cr] == b'\r' && rest[len] == b'\n' {
            len += 1;
        }

        if parser.parse_line(&rest[..len]).is_err() {
            return;
        }

        rest = &rest[len..];
    }
});
