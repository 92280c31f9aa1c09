//! Property-based tests for tokenizing and serializing messages.
//!
//! Uses the strategies from `slirc_client::proptest_support` to check that:
//! 1. Well-formed messages serialize and tokenize back unchanged
//! 2. The tokenizer never panics, whatever the input
//! 3. Tag, prefix, CTCP and glob invariants hold across random inputs
//!
//! Run with: `cargo test --features proptest`

#![cfg(feature = "proptest")]

use proptest::prelude::*;
use slirc_client::message::tags::format_tags;
use slirc_client::proptest_support::{
    channel, hostname, message_text, nickname, prefix, raw_message, username,
};
use slirc_client::{irc_eq, irc_to_lower, is_match, CtcpMessage, Hostmask, RawMessage};

/// CTCP parameters: no delimiter, CR, LF or NUL.
fn ctcp_params() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n\x00\x01]{0,80}").expect("valid regex")
}

// =============================================================================
// ROUND TRIPS
// =============================================================================

proptest! {
    /// serialize → parse = identity for every well-formed message.
    #[test]
    fn message_roundtrip(msg in raw_message()) {
        let wire = msg.serialize().expect("generated messages are valid");
        let parsed = RawMessage::parse(&wire).expect("serialized message should parse");
        prop_assert_eq!(&msg, &parsed, "roundtrip failed for {:?}", wire);
    }

    /// Display and serialize agree on valid messages.
    #[test]
    fn display_matches_serialize(msg in raw_message()) {
        prop_assert_eq!(msg.to_string(), msg.serialize().unwrap());
    }

    /// A line terminator on the input never reaches the tokens.
    #[test]
    fn crlf_is_stripped(msg in raw_message()) {
        let wire = format!("{}\r\n", msg.serialize().unwrap());
        prop_assert_eq!(RawMessage::parse(&wire).unwrap(), msg);
    }

    /// Whatever serialize accepts tokenizes back to the same parameters,
    /// including parameters that start with `:`.
    #[test]
    fn accepted_messages_roundtrip(params in prop::collection::vec("[!-~]{0,6}", 0..6)) {
        let msg = RawMessage::new("XCMD", params);
        if let Ok(wire) = msg.serialize() {
            prop_assert_eq!(RawMessage::parse(&wire).unwrap(), msg);
        }
    }

    /// Tag values survive escaping, whatever characters they contain.
    #[test]
    fn tag_value_roundtrip(
        key in "[a-z][a-z0-9-]{0,10}",
        value in "[^\r\n\x00]{1,40}",
    ) {
        let tag = format_tags([(key.as_str(), Some(value.as_str()))]);
        let msg = RawMessage::new("PING", ["token"]).with_tag(tag);

        let parsed = RawMessage::parse(&msg.serialize().unwrap()).unwrap();
        prop_assert_eq!(parsed.tag_value(&key), Some(Some(value)));
    }

    /// PRIVMSG text of any shape comes back as the last parameter.
    #[test]
    fn privmsg_text_roundtrip(target in channel(), text in message_text()) {
        let msg = RawMessage::new("PRIVMSG", [target.as_str(), text.as_str()]);
        let parsed = RawMessage::parse(&msg.serialize().unwrap()).unwrap();
        prop_assert_eq!(parsed.trailing(), Some(text.as_str()));
        prop_assert_eq!(parsed.param(0), Some(target.as_str()));
    }

    /// CTCP payloads come back unchanged through a carrier message.
    #[test]
    fn ctcp_roundtrip(
        command in "[A-Z]{1,10}",
        params in ctcp_params(),
        target in channel(),
    ) {
        let ctcp = CtcpMessage::new(command, params);
        let carrier = ctcp.to_query([target]).expect("valid CTCP");
        let wire = carrier.serialize().unwrap();

        let parsed = RawMessage::parse(&wire).unwrap();
        let extracted = CtcpMessage::try_extract(&parsed).expect("carrier holds CTCP");
        prop_assert_eq!(extracted, ctcp);
    }
}

// =============================================================================
// ROBUSTNESS
// =============================================================================

proptest! {
    /// The tokenizer returns, it does not panic.
    #[test]
    fn parse_never_panics(line in any::<String>()) {
        let _ = RawMessage::parse(&line);
    }

    /// Whatever tokenizes can be rendered without panicking.
    #[test]
    fn render_never_panics(line in "[ -~]{0,200}") {
        if let Ok(msg) = RawMessage::parse(&line) {
            let _ = msg.to_wire_string();
            let _ = msg.serialize();
        }
    }

    /// CTCP extraction never panics on arbitrary PRIVMSG text.
    #[test]
    fn ctcp_extract_never_panics(text in any::<String>()) {
        let msg = RawMessage::new("PRIVMSG", ["#c".to_owned(), text]);
        let _ = CtcpMessage::try_extract(&msg);
    }
}

// =============================================================================
// PREFIX, CASE AND GLOB INVARIANTS
// =============================================================================

proptest! {
    /// The nickname comes out of a full `nick!user@host` prefix.
    #[test]
    fn source_nickname_extraction(nick in nickname(), user in username(), host in hostname()) {
        let msg = RawMessage::new("PING", ["x"]).with_prefix(format!("{nick}!{user}@{host}"));
        prop_assert_eq!(msg.source_nickname(), Some(nick.as_str()));

        let mask = msg.hostmask().expect("full prefix");
        prop_assert_eq!(mask, Hostmask::new(nick, user, host));
    }

    /// Server-name prefixes carry no nickname.
    #[test]
    fn server_prefix_has_no_nickname(host in hostname()) {
        let msg = RawMessage::new("PING", ["x"]).with_prefix(host);
        prop_assert_eq!(msg.source_nickname(), None);
    }

    /// Any prefix parses back exactly.
    #[test]
    fn prefix_roundtrip(p in prefix()) {
        let msg = RawMessage::new("PING", ["x"]).with_prefix(p.clone());
        let parsed = RawMessage::parse(&msg.serialize().unwrap()).unwrap();
        prop_assert_eq!(parsed.prefix, Some(p));
    }

    /// Folding is idempotent and folded names compare equal.
    #[test]
    fn casemap_fold(nick in nickname()) {
        let folded = irc_to_lower(&nick);
        prop_assert_eq!(irc_to_lower(&folded), folded.clone());
        prop_assert!(irc_eq(&nick, &folded));
        prop_assert!(irc_eq(&nick.to_ascii_uppercase(), &nick));
    }

    /// Every hostmask matches itself, the catch-all and its own wildcard forms.
    #[test]
    fn glob_matches_own_hostmask(nick in nickname(), user in username(), host in hostname()) {
        let mask = Hostmask::new(nick.clone(), user.clone(), host.clone());
        let text = mask.to_string();

        prop_assert!(is_match(&text, &text));
        prop_assert!(is_match("*", &text));
        prop_assert!(mask.matches("*!*@*"));
        prop_assert!(mask.matches(&format!("{nick}!*@*")));
        prop_assert!(mask.matches(&format!("*!{user}@{host}")));

        let single: String = text.chars().map(|_| '?').collect();
        prop_assert!(is_match(&single, &text));
        prop_assert!(!is_match(&format!("{single}?"), &text));
    }
}
