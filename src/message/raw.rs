//! The untyped message form.

use std::fmt::{self, Write};
use std::str::FromStr;

use crate::command::MessageRegistry;
use crate::error::{InvalidMessageError, MessageParseError};
use crate::hostmask::Hostmask;
use crate::response::Response;

use super::tags::Tags;
use super::tokenizer::ParsedLine;

/// Upper bound on the number of parameters in one message.
pub const MAX_PARAMS: usize = 15;

/// One protocol line as tokens: optional tag and prefix, a command and up to
/// [`MAX_PARAMS`] parameters.
///
/// `RawMessage` is plain data. Inbound lines become `RawMessage`s without any
/// validation; outbound ones are checked by [`RawMessage::serialize`].
///
/// ```
/// use slirc_client::RawMessage;
///
/// let msg: RawMessage = ":nick!u@h PRIVMSG #rust :hello there".parse().unwrap();
/// assert_eq!(msg.command, "PRIVMSG");
/// assert_eq!(msg.params, ["#rust", "hello there"]);
/// assert_eq!(msg.serialize().unwrap(), ":nick!u@h PRIVMSG #rust :hello there");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawMessage {
    /// Raw IRCv3 tag token, without the leading `@`.
    pub tag: Option<String>,
    /// Message source, without the leading `:`.
    pub prefix: Option<String>,
    /// Command word or three-digit reply code.
    pub command: String,
    /// Parameters in order; only the last may contain spaces.
    pub params: Vec<String>,
}

impl RawMessage {
    /// Creates a message with no tag or prefix.
    pub fn new<C, I, S>(command: C, params: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RawMessage {
            tag: None,
            prefix: None,
            command: command.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Tokenizes one protocol line.
    pub fn parse(line: &str) -> Result<Self, MessageParseError> {
        ParsedLine::parse(line).map(RawMessage::from)
    }

    /// Sets the tag token.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Sets the prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Number of parameters.
    #[inline]
    pub fn parameter_count(&self) -> usize {
        self.params.len()
    }

    /// The parameter at `index`.
    #[inline]
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// The last parameter.
    #[inline]
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    /// Whether the command matches `command`, ignoring ASCII case.
    pub fn is_command(&self, command: &str) -> bool {
        self.command.eq_ignore_ascii_case(command)
    }

    /// The reply code, when the command is a known three-digit numeric.
    pub fn reply_code(&self) -> Option<Response> {
        Response::from_command(&self.command)
    }

    /// Whether this is a known `ERR_*` reply.
    pub fn is_error_reply(&self) -> bool {
        self.reply_code().map_or(false, |code| code.is_error())
    }

    /// Whether this is a PRIVMSG or NOTICE carrying a CTCP payload.
    pub fn is_ctcp(&self) -> bool {
        crate::ctcp::is_ctcp(self)
    }

    /// The nickname part of the prefix.
    ///
    /// A bare prefix containing a `.` names a server and yields `None`.
    pub fn source_nickname(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        match prefix.find(['!', '@']) {
            Some(0) => None,
            Some(end) => Some(&prefix[..end]),
            None if prefix.contains('.') || prefix.is_empty() => None,
            None => Some(prefix),
        }
    }

    /// The prefix as a full hostmask, when it is one.
    pub fn hostmask(&self) -> Option<Hostmask> {
        self.prefix.as_deref().and_then(|p| Hostmask::parse(p).ok())
    }

    /// The tags as unescaped `key`/`value` pairs.
    pub fn tags(&self) -> Tags<'_> {
        Tags::new(self.tag.as_deref().unwrap_or(""))
    }

    /// The unescaped value of one tag.
    ///
    /// Returns `Some(None)` for a tag present without a value.
    pub fn tag_value(&self, key: &str) -> Option<Option<String>> {
        self.tags().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Checks the structural rules every outbound line must follow, without
    /// consulting the registry.
    pub fn validate_structure(&self) -> Result<(), InvalidMessageError> {
        if self.command.trim().is_empty() {
            return Err(InvalidMessageError::EmptyCommand);
        }
        if !self.command.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidMessageError::InvalidCommand(self.command.clone()));
        }

        if let Some((_, middle)) = self.params.split_last() {
            for (index, param) in middle.iter().enumerate() {
                if param.is_empty() {
                    return Err(InvalidMessageError::EmptyParameter { index });
                }
                if param.contains(' ') {
                    return Err(InvalidMessageError::SpaceInParameter { index });
                }
                if param.starts_with(':') {
                    return Err(InvalidMessageError::ColonInParameter { index });
                }
            }
        }

        if self.params.len() > MAX_PARAMS {
            return Err(InvalidMessageError::TooManyParameters(self.params.len()));
        }

        for (index, param) in self.params.iter().enumerate() {
            if let Some(ch) = param.chars().find(|c| matches!(c, '\r' | '\n' | '\0')) {
                return Err(InvalidMessageError::IllegalCharacter { index, ch });
            }
        }

        for part in [&self.prefix, &self.tag].into_iter().flatten() {
            if part.is_empty() || part.contains([' ', '\r', '\n', '\0']) {
                return Err(InvalidMessageError::InvalidPrefix(part.clone()));
            }
        }

        Ok(())
    }

    /// Validates the message and renders its wire form, without CR-LF.
    ///
    /// Structural rules are checked first; then, if a typed variant is
    /// registered for the command, the variant's own rules.
    pub fn serialize(&self) -> Result<String, InvalidMessageError> {
        self.validate_structure()?;
        MessageRegistry::global().validate(self)?;
        Ok(self.to_wire_string())
    }

    /// Renders the wire form without any validation.
    ///
    /// The last parameter gets a `:` when it is empty, contains a space or
    /// itself starts with `:`.
    pub fn to_wire_string(&self) -> String {
        let mut out = String::with_capacity(self.wire_len_hint());
        // Writing into a String cannot fail.
        let _ = self.write_wire(&mut out);
        out
    }

    fn wire_len_hint(&self) -> usize {
        self.tag.as_ref().map_or(0, |t| t.len() + 2)
            + self.prefix.as_ref().map_or(0, |p| p.len() + 2)
            + self.command.len()
            + self.params.iter().map(|p| p.len() + 2).sum::<usize>()
    }

    fn write_wire(&self, f: &mut dyn Write) -> fmt::Result {
        if let Some(tag) = &self.tag {
            f.write_char('@')?;
            f.write_str(tag)?;
            f.write_char(' ')?;
        }
        if let Some(prefix) = &self.prefix {
            f.write_char(':')?;
            f.write_str(prefix)?;
            f.write_char(' ')?;
        }
        f.write_str(&self.command)?;

        if let Some((last, middle)) = self.params.split_last() {
            for param in middle {
                f.write_char(' ')?;
                f.write_str(param)?;
            }
            f.write_char(' ')?;
            if last.is_empty() || last.contains(' ') || last.starts_with(':') {
                f.write_char(':')?;
            }
            f.write_str(last)?;
        }
        Ok(())
    }
}

impl fmt::Display for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_wire(f)
    }
}

impl FromStr for RawMessage {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RawMessage::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_simple() {
        let msg = RawMessage::new("PRIVMSG", ["#a", "hi there"]);
        assert_eq!(msg.serialize().unwrap(), "PRIVMSG #a :hi there");
    }

    #[test]
    fn test_serialize_with_tag_and_prefix() {
        let msg = RawMessage::new("PRIVMSG", ["#a", "hi"])
            .with_prefix("n!u@h")
            .with_tag("msgid=1");
        assert_eq!(msg.serialize().unwrap(), "@msgid=1 :n!u@h PRIVMSG #a hi");
    }

    #[test]
    fn test_serialize_empty_and_colon_trailing() {
        let msg = RawMessage::new("TOPIC", ["#a", ""]);
        assert_eq!(msg.serialize().unwrap(), "TOPIC #a :");

        let msg = RawMessage::new("PRIVMSG", ["#a", ":)"]);
        assert_eq!(msg.serialize().unwrap(), "PRIVMSG #a ::)");
    }

    #[test]
    fn test_serialize_rejects_bad_command() {
        let msg = RawMessage::new("", Vec::<String>::new());
        assert_eq!(msg.serialize(), Err(InvalidMessageError::EmptyCommand));

        let msg = RawMessage::new("PRIV MSG", ["x"]);
        assert_eq!(
            msg.serialize(),
            Err(InvalidMessageError::InvalidCommand("PRIV MSG".into()))
        );
    }

    #[test]
    fn test_serialize_rejects_space_in_middle_param() {
        let msg = RawMessage::new("PRIVMSG", ["#a b", "hi"]);
        assert_eq!(
            msg.serialize(),
            Err(InvalidMessageError::SpaceInParameter { index: 0 })
        );
    }

    #[test]
    fn test_serialize_rejects_colon_in_middle_param() {
        let msg = RawMessage::new("XFOO", ["a", ":b", "c"]);
        assert_eq!(
            msg.serialize(),
            Err(InvalidMessageError::ColonInParameter { index: 1 })
        );

        // A colon inside a middle, or leading the last parameter, is fine.
        let msg = RawMessage::new("XFOO", ["a:b", ":c"]);
        let wire = msg.serialize().unwrap();
        assert_eq!(wire, "XFOO a:b ::c");
        assert_eq!(RawMessage::parse(&wire).unwrap(), msg);
    }

    #[test]
    fn test_serialize_rejects_empty_middle_param() {
        let msg = RawMessage::new("FOO", ["", "x"]);
        assert_eq!(
            msg.serialize(),
            Err(InvalidMessageError::EmptyParameter { index: 0 })
        );
    }

    #[test]
    fn test_serialize_rejects_too_many_params() {
        let params: Vec<String> = (0..16).map(|i| i.to_string()).collect();
        let msg = RawMessage::new("FOO", params);
        assert_eq!(
            msg.serialize(),
            Err(InvalidMessageError::TooManyParameters(16))
        );
    }

    #[test]
    fn test_serialize_rejects_line_breaks() {
        let msg = RawMessage::new("PRIVMSG", ["#a", "hi\r\nQUIT"]);
        assert_eq!(
            msg.serialize(),
            Err(InvalidMessageError::IllegalCharacter { index: 1, ch: '\r' })
        );
    }

    #[test]
    fn test_serialize_consults_registry() {
        let msg = RawMessage::new("PING", Vec::<String>::new());
        assert!(matches!(
            msg.serialize(),
            Err(InvalidMessageError::WrongParameterCount { got: 0, .. })
        ));
    }

    #[test]
    fn test_unregistered_command_is_structural_only() {
        let msg = RawMessage::new("XYZZY", ["a", "b c"]);
        assert_eq!(msg.serialize().unwrap(), "XYZZY a :b c");
    }

    #[test]
    fn test_wire_string_skips_validation() {
        let msg = RawMessage::new("PRIV MSG", ["a b", "c"]);
        assert_eq!(msg.to_wire_string(), "PRIV MSG a b c");
        assert_eq!(msg.to_string(), msg.to_wire_string());
    }

    #[test]
    fn test_reparse() {
        let line = "@a=b :n!u@h PRIVMSG #c :hello  world";
        let msg = RawMessage::parse(line).unwrap();
        let again = RawMessage::parse(&msg.serialize().unwrap()).unwrap();
        assert_eq!(msg, again);
    }

    #[test]
    fn test_reply_helpers() {
        let msg = RawMessage::parse(":srv 433 * guest :in use").unwrap();
        assert_eq!(msg.reply_code(), Some(Response::ERR_NICKNAMEINUSE));
        assert!(msg.is_error_reply());

        let msg = RawMessage::parse(":srv 001 guest :Welcome").unwrap();
        assert!(!msg.is_error_reply());
        assert!(RawMessage::new("PING", ["x"]).reply_code().is_none());
    }

    #[test]
    fn test_source_nickname() {
        let msg = RawMessage::parse(":nick!user@host PRIVMSG a b").unwrap();
        assert_eq!(msg.source_nickname(), Some("nick"));
        assert_eq!(msg.hostmask().unwrap().username, "user");

        let msg = RawMessage::parse(":irc.example.net NOTICE * :hi").unwrap();
        assert_eq!(msg.source_nickname(), None);
        assert!(msg.hostmask().is_none());

        let msg = RawMessage::parse(":nick NICK other").unwrap();
        assert_eq!(msg.source_nickname(), Some("nick"));
    }

    #[test]
    fn test_tag_value() {
        let msg = RawMessage::parse("@time=now;bot PING x").unwrap();
        assert_eq!(msg.tag_value("time"), Some(Some("now".to_string())));
        assert_eq!(msg.tag_value("bot"), Some(None));
        assert_eq!(msg.tag_value("nope"), None);
    }
}
