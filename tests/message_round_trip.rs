//! Integration tests for message parsing and serialization
//!
//! These tests verify that lines can be tokenized and then serialized back
//! to equivalent lines, and that typed variants survive the trip.

use slirc_client::command::{Join, Privmsg, Quit};
use slirc_client::message::tags::format_tags;
use slirc_client::{MessageRegistry, MessageVariant, RawMessage, TypedMessage};

fn round_trip(original: &str) -> RawMessage {
    let message = RawMessage::parse(original)
        .unwrap_or_else(|e| panic!("Failed to parse '{}': {}", original, e));
    let serialized = message
        .serialize()
        .unwrap_or_else(|e| panic!("Failed to serialize '{}': {}", original, e));

    let reparsed = RawMessage::parse(&serialized)
        .unwrap_or_else(|e| panic!("Failed to reparse '{}': {}", serialized, e));
    assert_eq!(message, reparsed, "Round-trip failed for '{}'", original);
    reparsed
}

#[test]
fn test_message_round_trip_simple() {
    let msg = round_trip("PING :irc.example.com");
    assert_eq!(msg.params, ["irc.example.com"]);
    // A single-word trailing parameter loses its colon.
    assert_eq!(msg.serialize().unwrap(), "PING irc.example.com");
}

#[test]
fn test_message_round_trip_with_prefix() {
    let msg = round_trip(":nick!user@host PRIVMSG #channel :Hello, world!");
    assert_eq!(msg.source_nickname(), Some("nick"));
    assert_eq!(
        msg.serialize().unwrap(),
        ":nick!user@host PRIVMSG #channel :Hello, world!"
    );
}

#[test]
fn test_message_round_trip_with_tags() {
    let msg = round_trip(
        "@time=2023-01-01T00:00:00.000Z;msgid=abc123 :nick!user@host PRIVMSG #channel :Tagged message",
    );
    assert_eq!(
        msg.tag_value("time"),
        Some(Some("2023-01-01T00:00:00.000Z".to_string()))
    );
    assert_eq!(msg.tag_value("msgid"), Some(Some("abc123".to_string())));
    assert_eq!(msg.tag_value("missing"), None);
}

#[test]
fn test_message_round_trip_numeric_response() {
    let msg = round_trip(":server 001 nickname :Welcome to the IRC Network");
    assert_eq!(msg.reply_code().map(|r| r.code()), Some(1));
}

#[test]
fn test_message_construction_and_parsing() {
    let tag = format_tags([
        ("time", Some("2023-01-01T00:00:00Z")),
        ("msgid", Some("test 123")),
    ]);
    let message = RawMessage::new("PRIVMSG", ["#test", "Integration test message"])
        .with_tag(tag)
        .with_prefix("testbot!test@example.com");

    let serialized = message.serialize().unwrap();
    assert_eq!(
        serialized,
        "@time=2023-01-01T00:00:00Z;msgid=test\\s123 :testbot!test@example.com PRIVMSG #test :Integration test message"
    );

    let parsed = RawMessage::parse(&serialized).expect("Failed to parse constructed message");
    assert_eq!(message, parsed);
    assert_eq!(parsed.tag_value("msgid"), Some(Some("test 123".to_string())));
}

#[test]
fn test_empty_trailing_parameter() {
    let msg = round_trip("PRIVMSG #channel :");
    assert_eq!(msg.params, ["#channel", ""]);
    assert_eq!(msg.serialize().unwrap(), "PRIVMSG #channel :");
}

#[test]
fn test_trailing_starting_with_colon() {
    let msg = round_trip("PRIVMSG #channel ::)");
    assert_eq!(msg.trailing(), Some(":)"));
    assert_eq!(msg.serialize().unwrap(), "PRIVMSG #channel ::)");
}

#[test]
fn test_special_characters_in_message() {
    let msg = round_trip(":nick!user@host PRIVMSG #channel :Message with üñíçødé and émøjí 🎉");
    assert_eq!(msg.trailing(), Some("Message with üñíçødé and émøjí 🎉"));
}

#[test]
fn test_mode_command_round_trip() {
    let msg = round_trip(":server MODE #channel +o nick");
    assert_eq!(msg.params, ["#channel", "+o", "nick"]);
    // MODE has no typed variant; the registry passes it through.
    assert!(MessageRegistry::global()
        .create_instance(msg)
        .unwrap()
        .is_none());
}

#[test]
fn test_join_command_variations() {
    let test_cases = vec![
        "JOIN #channel",
        "JOIN #channel key",
        ":nick!user@host JOIN #channel",
        "JOIN #channel1,#channel2 key1,key2",
    ];

    for original in test_cases {
        let msg = round_trip(original);
        match MessageRegistry::global().create_instance(msg).unwrap() {
            Some(TypedMessage::Join(_)) => {}
            other => panic!("Expected JOIN for '{}', got {:?}", original, other),
        }
    }

    let join = Join::from_raw(RawMessage::parse("JOIN #a,#b k1,k2").unwrap()).unwrap();
    assert_eq!(join.channels().collect::<Vec<_>>(), ["#a", "#b"]);
    assert_eq!(join.keys().collect::<Vec<_>>(), ["k1", "k2"]);
}

#[test]
fn test_unregistered_commands_round_trip() {
    let test_cases = vec![
        "BATCH +abc123 chathistory #channel",
        "BATCH -abc123",
        "@batch=abc123 :server PRIVMSG #channel :Batched message",
        "KNOCK #secretroom :Please let me in!",
        "CAP * LS :multi-prefix sasl",
    ];

    for original in test_cases {
        round_trip(original);
    }
}

#[test]
fn test_fifteen_parameter_limit() {
    let line = "CMD 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17";
    let msg = RawMessage::parse(line).unwrap();
    assert_eq!(msg.parameter_count(), 15);
    assert_eq!(msg.trailing(), Some("15 16 17"));

    // The absorbed tail contains spaces, so it gets a colon on the way out.
    assert_eq!(
        msg.serialize().unwrap(),
        "CMD 1 2 3 4 5 6 7 8 9 10 11 12 13 14 :15 16 17"
    );
    round_trip(line);
}

#[test]
fn test_typed_variants_serialize() {
    let msg: RawMessage = Privmsg::new(["#a", "#b"], "hello world").into();
    assert_eq!(msg.serialize().unwrap(), "PRIVMSG #a,#b :hello world");

    let quit: RawMessage = Quit::new(None).into();
    assert_eq!(quit.serialize().unwrap(), "QUIT");

    let quit: RawMessage = Quit::new(Some("bye".to_string())).into();
    assert_eq!(quit.serialize().unwrap(), "QUIT bye");
}

#[test]
fn test_registered_command_validation_on_serialize() {
    // PRIVMSG needs a target and a text.
    assert!(RawMessage::new("PRIVMSG", ["#only"]).serialize().is_err());
    // Unknown commands only face the structural rules.
    assert!(RawMessage::new("FROB", ["#only"]).serialize().is_ok());
}
