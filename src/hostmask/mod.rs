//! The `nick!user@host` identity model.
//!
//! A [`Hostmask`] names a user on the network. Hostmasks are what ban lists,
//! ignore lists and access checks are written against, so this module also
//! exposes the glob matcher ([`is_match`]) those patterns use.

mod pattern;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use self::pattern::is_match;

/// Errors parsing a hostmask from its canonical form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HostmaskParseError {
    /// No `!` separating nickname and username.
    #[error("hostmask {0:?} has no '!' separator")]
    MissingUser(String),
    /// No `@` separating username and hostname.
    #[error("hostmask {0:?} has no '@' separator")]
    MissingHost(String),
    /// One of the three parts was empty.
    #[error("hostmask {0:?} has an empty part")]
    EmptyPart(String),
}

/// A parsed `nickname!username@hostname` triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hostmask {
    /// The nickname.
    pub nickname: String,
    /// The username. A leading `~` means the host runs no ident service.
    pub username: String,
    /// The hostname; may be an IP address or a cloak.
    pub hostname: String,
}

impl Hostmask {
    /// Builds a hostmask from its parts.
    pub fn new(
        nickname: impl Into<String>,
        username: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Hostmask {
            nickname: nickname.into(),
            username: username.into(),
            hostname: hostname.into(),
        }
    }

    /// Parses `nick!user@host`. All three parts are required.
    ///
    /// The nickname ends at the first `!`, the username at the first `@`
    /// after it; the hostname is everything that follows.
    pub fn parse(s: &str) -> Result<Self, HostmaskParseError> {
        let (nickname, rest) = s
            .split_once('!')
            .ok_or_else(|| HostmaskParseError::MissingUser(s.to_owned()))?;
        let (username, hostname) = rest
            .split_once('@')
            .ok_or_else(|| HostmaskParseError::MissingHost(s.to_owned()))?;

        if nickname.is_empty() || username.is_empty() || hostname.is_empty() {
            return Err(HostmaskParseError::EmptyPart(s.to_owned()));
        }

        Ok(Hostmask::new(nickname, username, hostname))
    }

    /// `false` when the username carries the `~` no-ident marker.
    pub fn is_ident(&self) -> bool {
        !self.username.starts_with('~')
    }

    /// The `username@hostname` part.
    pub fn user_host(&self) -> String {
        format!("{}@{}", self.username, self.hostname)
    }

    /// Matches this hostmask against a `*`/`?` glob such as `*!*@*.example`.
    pub fn matches(&self, pattern: &str) -> bool {
        is_match(pattern, &self.to_string())
    }
}

impl fmt::Display for Hostmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}@{}", self.nickname, self.username, self.hostname)
    }
}

impl FromStr for Hostmask {
    type Err = HostmaskParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hostmask::parse(s)
    }
}
