//! Fuzz target for CTCP extraction and rebuilding

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::{CtcpMessage, RawMessage};

fuzz_target!(|text: String| {
    let carrier = RawMessage::new("PRIVMSG", ["#fuzz".to_owned(), text]);
    let Some(ctcp) = CtcpMessage::try_extract(&carrier) else {
        return;
    };

    // Anything extracted without a stray delimiter rebuilds to the same thing.
    if let Ok(rebuilt) = ctcp.to_query(["#fuzz"]) {
        if !ctcp.params.contains('\x01') {
            assert_eq!(CtcpMessage::try_extract(&rebuilt), Some(ctcp));
        }
    }
});
