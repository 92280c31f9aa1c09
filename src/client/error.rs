//! Errors raised by the connection pipeline.

use std::io;

use thiserror::Error;

use crate::error::{InvalidCtcpError, InvalidMessageError, MessageParseError, ReplyError};
use crate::line::LineCodecError;

/// Failures while establishing a connection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectError {
    /// A connection is already live or being set up.
    #[error("already connected")]
    AlreadyConnected,

    /// Name resolution or the TCP connect failed.
    #[error("connection failed: {0}")]
    Io(#[from] io::Error),

    /// The host is not usable as a TLS server name.
    #[error("invalid server name {0:?}")]
    InvalidServerName(String),

    /// The TLS handshake failed.
    #[error("TLS handshake failed: {0}")]
    Tls(#[source] io::Error),

    /// TLS was requested but no secure channel factory is configured.
    #[error("TLS requested but no secure channel factory configured")]
    NoSecureChannel,

    /// Connected, but the registration messages could not be queued.
    #[error("registration failed: {0}")]
    Register(#[from] SendError),

    /// The configured line codec could not be built.
    #[error("line codec: {0}")]
    Codec(#[from] LineCodecError),
}

/// A received message could not be handled.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DispatchError {
    /// The message failed its typed variant's validation.
    #[error("invalid message: {0}")]
    Invalid(#[from] InvalidMessageError),

    /// A CTCP payload was malformed.
    #[error("invalid CTCP message: {0}")]
    Ctcp(#[from] InvalidCtcpError),

    /// A fatal sink turned a server reply into an error.
    #[error(transparent)]
    Reply(#[from] ReplyError),

    /// A sink handler returned an error.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),

    /// A sink handler panicked. Carries the panic message.
    #[error("sink handler panicked: {0}")]
    Panicked(String),
}

/// Failures queueing an outbound message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SendError {
    /// There is no live connection.
    #[error("not connected")]
    NotConnected,

    /// The message failed validation and was not sent.
    #[error("refusing to send invalid message: {0}")]
    Invalid(#[from] InvalidMessageError),

    /// A CTCP message could not be built.
    #[error("refusing to send invalid CTCP message: {0}")]
    Ctcp(#[from] InvalidCtcpError),
}

/// Registration did not complete.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum RegisterError {
    /// The server already confirmed registration.
    #[error("already registered")]
    AlreadyRegistered,

    /// Another registration is waiting for the server.
    #[error("a registration is already in progress")]
    InProgress,

    /// NICK or USER could not be queued.
    #[error("registration failed: {0}")]
    Send(#[from] SendError),

    /// A fatal sink matched the server's answer, e.g. 433 for a nickname
    /// in use.
    #[error("registration rejected: {0}")]
    Rejected(ReplyError),

    /// The connection ended before the server answered.
    #[error("connection closed before registration completed")]
    Disconnected,
}

/// A received line broke the protocol and was skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InboundViolation {
    /// The line exceeded the length limit.
    #[error("line of {actual} bytes exceeds limit of {limit}")]
    TooLong {
        /// Bytes discarded.
        actual: usize,
        /// The configured limit.
        limit: usize,
    },

    /// The line was not valid in the connection's encoding.
    #[error("line is not valid {encoding}")]
    Undecodable {
        /// Name of the encoding.
        encoding: &'static str,
    },

    /// The line could not be tokenized.
    #[error("malformed line {line:?}: {error}")]
    Malformed {
        /// The offending line.
        line: String,
        /// Why tokenizing failed.
        #[source]
        error: MessageParseError,
    },
}

impl InboundViolation {
    /// Maps a per-line codec problem. I/O and setup errors are not
    /// violations and yield `None`.
    pub(crate) fn from_codec(err: LineCodecError) -> Option<Self> {
        match err {
            LineCodecError::LineTooLong { actual, limit } => {
                Some(InboundViolation::TooLong { actual, limit })
            }
            LineCodecError::Decode { encoding } => Some(InboundViolation::Undecodable { encoding }),
            _ => None,
        }
    }
}
