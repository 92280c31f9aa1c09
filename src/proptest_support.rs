//! Proptest strategies for generating well-formed messages.
//!
//! Every [`RawMessage`] produced here passes [`RawMessage::serialize`], and
//! its wire form tokenizes back into an equal value.

use proptest::prelude::*;

use crate::message::tags::format_tags;
use crate::message::RawMessage;

/// Nicknames: a letter followed by letters, digits and the usual specials.
pub fn nickname() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_\\[\\]{}|^`-]{0,15}").expect("valid regex")
}

/// Usernames, without the `~` ident marker.
pub fn username() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9]{0,9}").expect("valid regex")
}

/// Dotted hostnames.
pub fn hostname() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,10}(\\.[a-z]{2,6}){1,3}").expect("valid regex")
}

/// `#` or `&` channel names.
pub fn channel() -> impl Strategy<Value = String> {
    prop::string::string_regex("[#&][a-zA-Z0-9_-]{1,20}").expect("valid regex")
}

/// Free text: anything but CR, LF and NUL, possibly empty or starting with `:`.
pub fn message_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n\x00]{0,120}").expect("valid regex")
}

/// A middle parameter: non-empty, no spaces, no leading `:`.
pub fn middle_param() -> impl Strategy<Value = String> {
    prop::string::string_regex("[!-9;-~][!-~]{0,15}").expect("valid regex")
}

/// A `nick!user@host` or server-name prefix.
pub fn prefix() -> impl Strategy<Value = String> {
    prop_oneof![
        hostname(),
        (nickname(), username(), hostname())
            .prop_map(|(nick, user, host)| format!("{nick}!{user}@{host}")),
    ]
}

/// A tag token with one to four entries, values escaped.
pub fn tag_token() -> impl Strategy<Value = String> {
    let key = prop::string::string_regex("(\\+)?[a-z][a-z0-9-]{0,10}").expect("valid regex");
    let value = prop::option::of(
        prop::string::string_regex("[^\r\n\x00]{1,20}").expect("valid regex"),
    );
    prop::collection::vec((key, value), 1..5).prop_map(|pairs| {
        format_tags(
            pairs
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_deref())),
        )
    })
}

/// A command no variant is registered for, followed by parameters.
fn unregistered() -> impl Strategy<Value = RawMessage> {
    (
        prop::string::string_regex("X[A-Z]{2,8}").expect("valid regex"),
        prop::collection::vec(middle_param(), 0..(crate::MAX_PARAMS - 1)),
        prop::option::of(message_text()),
    )
        .prop_map(|(command, mut params, trailing)| {
            params.extend(trailing);
            RawMessage::new(command, params)
        })
}

fn registered() -> impl Strategy<Value = RawMessage> {
    prop_oneof![
        (channel(), message_text()).prop_map(|(c, t)| RawMessage::new("PRIVMSG", [c, t])),
        (channel(), message_text()).prop_map(|(c, t)| RawMessage::new("NOTICE", [c, t])),
        nickname().prop_map(|n| RawMessage::new("NICK", [n])),
        channel().prop_map(|c| RawMessage::new("JOIN", [c])),
        (channel(), message_text()).prop_map(|(c, r)| RawMessage::new("PART", [c, r])),
        hostname().prop_map(|h| RawMessage::new("PING", [h])),
        message_text().prop_map(|r| RawMessage::new("QUIT", [r])),
    ]
}

/// Any well-formed message, optionally tagged and prefixed.
pub fn raw_message() -> impl Strategy<Value = RawMessage> {
    (
        prop::option::of(tag_token()),
        prop::option::of(prefix()),
        prop_oneof![registered(), unregistered()],
    )
        .prop_map(|(tag, prefix, mut msg)| {
            msg.tag = tag;
            msg.prefix = prefix;
            msg
        })
}
