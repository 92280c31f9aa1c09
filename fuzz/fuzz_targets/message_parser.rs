//! Fuzz target for message tokenizing
//!
//! Feeds random lines to the tokenizer and checks that anything it accepts
//! and the serializer then approves survives a second trip unchanged.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::{MessageRegistry, RawMessage};
use std::str;

fuzz_target!(|data: &[u8]| {
    // Only fuzz valid UTF-8 strings to focus on protocol-level issues
    if let Ok(input) = str::from_utf8(data) {
        if input.is_empty() || input.len() > 8191 {
            return;
        }

        let Ok(msg) = RawMessage::parse(input) else {
            return;
        };
        let _ = msg.tags().count();
        let _ = msg.source_nickname();
        let _ = MessageRegistry::global().create_instance(msg.clone());

        if let Ok(wire) = msg.serialize() {
            let again = RawMessage::parse(&wire).expect("serialized line must tokenize");
            assert_eq!(again, msg, "round trip changed {:?}", wire);
        }
    }
});
