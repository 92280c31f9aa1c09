//! Client-To-Client Protocol.
//!
//! A CTCP message rides in the last parameter of a PRIVMSG (a query) or a
//! NOTICE (a reply), wrapped in `\x01` bytes:
//!
//! ```text
//! PRIVMSG bob :\x01PING 12345\x01
//! ```
//!
//! Only the leading delimiter is required on receipt; many clients drop the
//! closing one.

use std::fmt;

use crate::error::InvalidCtcpError;
use crate::message::RawMessage;

/// The CTCP delimiter byte.
pub const DELIMITER: char = '\x01';

/// Well-known CTCP commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CtcpKind {
    /// `ACTION`, the `/me` emote.
    Action,
    /// `PING`
    Ping,
    /// `VERSION`
    Version,
    /// `TIME`
    Time,
    /// `CLIENTINFO`
    ClientInfo,
    /// `SOURCE`
    Source,
    /// `USERINFO`
    UserInfo,
    /// `FINGER`
    Finger,
    /// `DCC`
    Dcc,
    /// Anything else.
    Other,
}

impl CtcpKind {
    /// Classifies a command word, ignoring ASCII case.
    pub fn from_command(command: &str) -> Self {
        const KINDS: &[(&str, CtcpKind)] = &[
            ("ACTION", CtcpKind::Action),
            ("PING", CtcpKind::Ping),
            ("VERSION", CtcpKind::Version),
            ("TIME", CtcpKind::Time),
            ("CLIENTINFO", CtcpKind::ClientInfo),
            ("SOURCE", CtcpKind::Source),
            ("USERINFO", CtcpKind::UserInfo),
            ("FINGER", CtcpKind::Finger),
            ("DCC", CtcpKind::Dcc),
        ];
        KINDS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(command))
            .map_or(CtcpKind::Other, |(_, kind)| *kind)
    }
}

/// Whether `raw` is a PRIVMSG or NOTICE whose last parameter starts with the
/// CTCP delimiter.
pub fn is_ctcp(raw: &RawMessage) -> bool {
    carrier_payload(raw).is_some()
}

fn carrier_payload(raw: &RawMessage) -> Option<&str> {
    if !raw.is_command("PRIVMSG") && !raw.is_command("NOTICE") {
        return None;
    }
    let trailing = raw.trailing()?;
    if trailing.trim().is_empty() {
        return None;
    }
    trailing.strip_prefix(DELIMITER)
}

/// A CTCP command and its parameter string.
///
/// Equality compares `command` and `params` only.
#[derive(Clone, Debug)]
pub struct CtcpMessage {
    /// The CTCP command word.
    pub command: String,
    /// Everything after the command and one space; may be empty.
    pub params: String,
    raw: Option<RawMessage>,
}

impl CtcpMessage {
    /// Creates a CTCP message to be sent.
    pub fn new(command: impl Into<String>, params: impl Into<String>) -> Self {
        CtcpMessage {
            command: command.into(),
            params: params.into(),
            raw: None,
        }
    }

    /// An `ACTION` carrying `text`.
    pub fn action(text: impl Into<String>) -> Self {
        Self::new("ACTION", text)
    }

    /// Pulls the CTCP message out of a PRIVMSG or NOTICE.
    ///
    /// Returns `None` when `raw` carries no CTCP payload or the payload has
    /// no command word.
    pub fn try_extract(raw: &RawMessage) -> Option<Self> {
        let payload = carrier_payload(raw)?;
        let payload = payload.strip_suffix(DELIMITER).unwrap_or(payload);
        let (command, params) = payload.split_once(' ').unwrap_or((payload, ""));
        if command.is_empty() {
            return None;
        }
        Some(CtcpMessage {
            command: command.to_owned(),
            params: params.to_owned(),
            raw: Some(raw.clone()),
        })
    }

    /// The classified command.
    pub fn kind(&self) -> CtcpKind {
        CtcpKind::from_command(&self.command)
    }

    /// The message this was extracted from.
    pub fn raw(&self) -> Option<&RawMessage> {
        self.raw.as_ref()
    }

    /// `true` when extracted from a PRIVMSG.
    pub fn is_query(&self) -> bool {
        self.raw.as_ref().map_or(false, |raw| raw.is_command("PRIVMSG"))
    }

    /// `true` when extracted from a NOTICE.
    pub fn is_reply(&self) -> bool {
        self.raw.as_ref().map_or(false, |raw| raw.is_command("NOTICE"))
    }

    /// The nickname that sent this message, if known.
    pub fn sender(&self) -> Option<&str> {
        self.raw.as_ref().and_then(RawMessage::source_nickname)
    }

    /// The delimited body placed in the carrier's last parameter.
    pub fn body(&self) -> String {
        let mut body = String::with_capacity(self.command.len() + self.params.len() + 3);
        body.push(DELIMITER);
        body.push_str(&self.command);
        if !self.params.is_empty() {
            body.push(' ');
            body.push_str(&self.params);
        }
        body.push(DELIMITER);
        body
    }

    /// Wraps this message in a PRIVMSG to `targets`.
    pub fn to_query<I, S>(&self, targets: I) -> Result<RawMessage, InvalidCtcpError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.to_carrier("PRIVMSG", targets)
    }

    /// Wraps this message in a NOTICE to `targets`.
    pub fn to_reply<I, S>(&self, targets: I) -> Result<RawMessage, InvalidCtcpError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.to_carrier("NOTICE", targets)
    }

    fn to_carrier<I, S>(&self, command: &str, targets: I) -> Result<RawMessage, InvalidCtcpError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.command.trim().is_empty() {
            return Err(InvalidCtcpError::EmptyCommand);
        }
        if self.command.contains([' ', DELIMITER]) {
            return Err(InvalidCtcpError::InvalidCommand(self.command.clone()));
        }

        let targets: Vec<S> = targets.into_iter().collect();
        if targets.is_empty() {
            return Err(InvalidCtcpError::NoTargets);
        }
        let targets = targets
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(",");

        let raw = RawMessage::new(command, [targets, self.body()]);
        raw.validate_structure()?;
        Ok(raw)
    }
}

impl PartialEq for CtcpMessage {
    fn eq(&self, other: &Self) -> bool {
        self.command == other.command && self.params == other.params
    }
}

impl Eq for CtcpMessage {}

impl fmt::Display for CtcpMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            f.write_str(&self.command)
        } else {
            write!(f, "{} {}", self.command, self.params)
        }
    }
}
