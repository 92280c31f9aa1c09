//! Error types for the IRC protocol core.
//!
//! This module defines the errors raised while tokenizing inbound lines,
//! validating or serializing messages, building CTCP sub-messages and
//! populating the typed message registry. Errors that only exist once a
//! connection is involved live in [`crate::client`].

use thiserror::Error;

use crate::command::ParamCount;
use crate::message::RawMessage;
use crate::response::Response;

/// Convenience type alias for Results using [`InvalidMessageError`].
pub type Result<T, E = InvalidMessageError> = std::result::Result<T, E>;

/// Errors encountered when tokenizing a protocol line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The line was empty or contained only spaces.
    #[error("empty message")]
    EmptyMessage,

    /// The line had a tag and/or prefix but no command word.
    #[error("missing command at position {position}")]
    MissingCommand {
        /// Byte offset where the command was expected.
        position: usize,
    },
}

/// A message is structurally unfit for the wire or for its typed variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidMessageError {
    /// The command was empty or blank.
    #[error("message command is empty")]
    EmptyCommand,

    /// The command contained something other than letters and digits.
    #[error("invalid command {0:?}: only letters and digits are allowed")]
    InvalidCommand(String),

    /// A parameter other than the last contained a space.
    #[error("parameter {index} contains a space; only the last parameter may")]
    SpaceInParameter {
        /// Zero-based parameter index.
        index: usize,
    },

    /// A parameter other than the last started with `:`.
    #[error("parameter {index} starts with ':'; only the last parameter may")]
    ColonInParameter {
        /// Zero-based parameter index.
        index: usize,
    },

    /// A parameter other than the last was empty.
    #[error("parameter {index} is empty; only the last parameter may be")]
    EmptyParameter {
        /// Zero-based parameter index.
        index: usize,
    },

    /// A parameter contained CR, LF or NUL.
    #[error("parameter {index} contains illegal character {ch:?}")]
    IllegalCharacter {
        /// Zero-based parameter index.
        index: usize,
        /// The offending character.
        ch: char,
    },

    /// More than [`crate::message::MAX_PARAMS`] parameters.
    #[error("too many parameters: {0} (max 15)")]
    TooManyParameters(usize),

    /// Parameter count outside what the typed variant accepts.
    #[error("{command} expects {expected} parameter(s), got {got}")]
    WrongParameterCount {
        /// The command or reply code being validated.
        command: String,
        /// The accepted count.
        expected: ParamCount,
        /// The actual count.
        got: usize,
    },

    /// The prefix or tag token is empty or contains a space or line break.
    #[error("invalid prefix or tag {0:?}")]
    InvalidPrefix(String),

    /// The line cannot be represented in the connection's encoding.
    #[error("message is not representable in {encoding}")]
    Unencodable {
        /// Name of the encoding.
        encoding: &'static str,
    },

    /// A parameter failed a variant-specific format check.
    #[error("{command}: invalid argument: {reason}")]
    InvalidArgument {
        /// The command or reply code being validated.
        command: String,
        /// What was wrong.
        reason: String,
    },
}

impl InvalidMessageError {
    /// Shorthand for a parameter count mismatch.
    pub fn wrong_count(raw: &RawMessage, expected: ParamCount) -> Self {
        InvalidMessageError::WrongParameterCount {
            command: raw.command.clone(),
            expected,
            got: raw.parameter_count(),
        }
    }
}

/// Errors building or extracting a CTCP sub-message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidCtcpError {
    /// The CTCP command was empty or blank.
    #[error("CTCP command must not be empty or blank")]
    EmptyCommand,

    /// The CTCP command contained a space or a delimiter byte.
    #[error("invalid CTCP command {0:?}")]
    InvalidCommand(String),

    /// No target was given for the enclosing PRIVMSG/NOTICE.
    #[error("CTCP message needs at least one target")]
    NoTargets,

    /// The enclosing message failed validation.
    #[error("invalid CTCP carrier message: {0}")]
    Message(#[from] InvalidMessageError),
}

/// An error reply from the server that a fatal sink turned into an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyError {
    /// The reply code.
    pub code: Response,
    /// The message carrying the reply.
    pub message: RawMessage,
}

impl ReplyError {
    /// Human-readable part of the reply (its trailing parameter).
    pub fn text(&self) -> &str {
        self.message.trailing().unwrap_or("")
    }
}

impl std::fmt::Display for ReplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "server replied {} ({}): {}",
            self.code,
            self.code.name(),
            self.text()
        )
    }
}

impl std::error::Error for ReplyError {}

/// Errors populating a [`crate::command::MessageRegistry`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// Two variants claimed the same key.
    #[error("duplicate message registration for {0}")]
    Duplicate(String),
}
