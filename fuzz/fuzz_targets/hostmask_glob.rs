//! Fuzz target for hostmask glob matching
//!
//! The matcher must terminate on any input, and a pattern made from the
//! input itself must always match.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::is_match;

fuzz_target!(|input: (String, String)| {
    let (pattern, text) = input;
    let _ = is_match(&pattern, &text);

    if !text.contains(['*', '?']) {
        assert!(is_match(&text, &text));
        assert!(is_match(&format!("*{text}*"), &text));
    }
});
