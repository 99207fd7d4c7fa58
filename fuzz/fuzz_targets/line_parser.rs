//! Fuzz target for line parsing and event mapping
//!
//! Feeds arbitrary text through the parser and the mapper, which must never
//! panic regardless of input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

use slirc_session::mapper::ping_reply;
use slirc_session::{map_line, ParsedLine, SessionOptions};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        if input.len() > 8191 {
            return;
        }

        if let Ok(line) = ParsedLine::parse(input) {
            let _ = ping_reply(&line);
            let _ = map_line(&line, &SessionOptions::new("fuzzbot"));
        }
    }
});
