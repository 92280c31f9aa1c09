//! # slirc-client
//!
//! The protocol core of an IRC client: turns a line stream from a socket
//! into typed protocol events, and typed outbound commands back into
//! conformant lines.
//!
//! ## Features
//!
//! - Line tokenizer for tags, prefixes, commands and parameters
//! - Validating serializer for outbound messages
//! - Registry of typed message variants with per-variant validation
//! - CTCP codec for the sub-protocol inside PRIVMSG/NOTICE
//! - Hostmask model with `*`/`?` glob matching
//! - Optional Tokio connection pipeline with a sink table and event hooks

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Parsing
//!
//! ```rust
//! use slirc_client::{MessageRegistry, RawMessage, TypedMessage};
//!
//! let raw: RawMessage = ":srv 001 guest :Welcome to the network".parse().unwrap();
//! assert_eq!(raw.params, ["guest", "Welcome to the network"]);
//!
//! match MessageRegistry::global().create_instance(raw).unwrap() {
//!     Some(TypedMessage::Welcome(welcome)) => assert_eq!(welcome.client(), "guest"),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```
//!
//! ### Building
//!
//! ```rust
//! use slirc_client::{CtcpMessage, RawMessage};
//!
//! let msg = RawMessage::new("PRIVMSG", ["#rust", "hello there"]);
//! assert_eq!(msg.serialize().unwrap(), "PRIVMSG #rust :hello there");
//!
//! // Spaces in a middle parameter never reach the wire.
//! assert!(RawMessage::new("PRIVMSG", ["#a b", "hi"]).serialize().is_err());
//!
//! let ping = CtcpMessage::new("PING", "12345").to_query(["bob"]).unwrap();
//! assert_eq!(ping.params[1], "\x01PING 12345\x01");
//! ```

pub mod casemap;
pub mod command;
pub mod ctcp;
pub mod error;
pub mod hostmask;
pub mod message;
pub mod response;

#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod client;
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod line;

pub use self::casemap::{irc_eq, irc_to_lower};
pub use self::command::{MessageRegistry, MessageVariant, ParamCount, TypedMessage};
pub use self::ctcp::{CtcpKind, CtcpMessage};
pub use self::error::{
    InvalidCtcpError, InvalidMessageError, MessageParseError, RegistryError, ReplyError,
};
pub use self::hostmask::{is_match, Hostmask};
pub use self::message::{RawMessage, MAX_PARAMS};
pub use self::response::Response;

#[cfg(feature = "tokio")]
pub use self::client::{Client, ClientBuilder, ClientConfig, ClientEvents, SecurityMode};
#[cfg(feature = "tokio")]
pub use self::line::{LineCodec, MAX_IRC_LINE_LEN};

#[cfg(feature = "proptest")]
pub mod proptest_support;
