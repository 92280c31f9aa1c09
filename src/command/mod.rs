//! Typed message variants and the registry that builds them.
//!
//! Every variant wraps a [`RawMessage`] and adds a parameter-count check plus
//! named accessors. The [`MessageRegistry`] maps a command word or reply code
//! to the variant that validates it.

#[macro_use]
mod macros;

mod channel;
mod connection;
mod messaging;
mod registry;
mod replies;

use std::any::Any;
use std::fmt;

use crate::error::InvalidMessageError;
use crate::message::RawMessage;

pub use self::channel::{Join, Part};
pub use self::connection::{ErrorMessage, Nick, Pass, Ping, Pong, Quit, User};
pub use self::messaging::{Notice, Privmsg};
pub use self::registry::{Builder, MessageRegistry, Validator};
pub use self::replies::{Bounce, Created, ISupport, MyInfo, NickError, UModeIs, Welcome, YourHost};

/// How many parameters a variant accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamCount {
    /// Exactly `n`.
    Exactly(usize),
    /// Between `min` and `max`, inclusive.
    Between(usize, usize),
    /// `n` or more.
    AtLeast(usize),
}

impl ParamCount {
    /// Whether `n` parameters are acceptable.
    pub fn accepts(self, n: usize) -> bool {
        match self {
            ParamCount::Exactly(exact) => n == exact,
            ParamCount::Between(min, max) => (min..=max).contains(&n),
            ParamCount::AtLeast(min) => n >= min,
        }
    }

    /// The smallest acceptable count.
    pub fn min(self) -> usize {
        match self {
            ParamCount::Exactly(n) | ParamCount::Between(n, _) | ParamCount::AtLeast(n) => n,
        }
    }

    /// Checks `raw` against this count.
    pub fn check(self, raw: &RawMessage) -> Result<(), InvalidMessageError> {
        if self.accepts(raw.parameter_count()) {
            Ok(())
        } else {
            Err(InvalidMessageError::wrong_count(raw, self))
        }
    }
}

impl fmt::Display for ParamCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamCount::Exactly(n) => write!(f, "{}", n),
            ParamCount::Between(min, max) => write!(f, "{} to {}", min, max),
            ParamCount::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// A typed view over a [`RawMessage`].
///
/// Implementations are usually generated with the crate's variant macro, but
/// the trait is public so applications can register their own variants with
/// [`MessageRegistry::register_variant`].
pub trait MessageVariant: Sized + Into<TypedMessage> {
    /// Command words or reply codes this variant is registered under.
    const KEYS: &'static [&'static str];

    /// Accepted parameter count.
    const PARAMS: ParamCount;

    /// Checks whether `raw` satisfies this variant's rules.
    fn validate(raw: &RawMessage) -> Result<(), InvalidMessageError> {
        Self::PARAMS.check(raw)
    }

    /// Wraps `raw` without validating it.
    fn wrap(raw: RawMessage) -> Self;

    /// The wrapped message.
    fn raw(&self) -> &RawMessage;

    /// Unwraps the message.
    fn into_raw(self) -> RawMessage;

    /// Validates and wraps `raw`.
    fn from_raw(raw: RawMessage) -> Result<Self, InvalidMessageError> {
        Self::validate(&raw)?;
        Ok(Self::wrap(raw))
    }
}

/// An application-defined variant carried by [`TypedMessage::Extension`].
pub trait ExtensionMessage: fmt::Debug + Send + Sync + 'static {
    /// The wrapped message.
    fn raw(&self) -> &RawMessage;

    /// For downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// The typed form of an inbound or outbound message.
#[derive(Debug)]
#[non_exhaustive]
pub enum TypedMessage {
    /// `PASS`
    Pass(Pass),
    /// `NICK`
    Nick(Nick),
    /// `USER`
    User(User),
    /// `PING`
    Ping(Ping),
    /// `PONG`
    Pong(Pong),
    /// `QUIT`
    Quit(Quit),
    /// `ERROR`
    Error(ErrorMessage),
    /// `JOIN`
    Join(Join),
    /// `PART`
    Part(Part),
    /// `PRIVMSG`
    Privmsg(Privmsg),
    /// `NOTICE`
    Notice(Notice),
    /// `001`
    Welcome(Welcome),
    /// `002`
    YourHost(YourHost),
    /// `003`
    Created(Created),
    /// `004`
    MyInfo(MyInfo),
    /// `005`
    ISupport(ISupport),
    /// `010`
    Bounce(Bounce),
    /// `221`
    UModeIs(UModeIs),
    /// `431`, `432`, `433` and `436`
    NickError(NickError),
    /// A variant registered by the application.
    Extension(Box<dyn ExtensionMessage>),
}

impl TypedMessage {
    /// The wrapped message.
    pub fn raw(&self) -> &RawMessage {
        match self {
            TypedMessage::Pass(m) => m.raw(),
            TypedMessage::Nick(m) => m.raw(),
            TypedMessage::User(m) => m.raw(),
            TypedMessage::Ping(m) => m.raw(),
            TypedMessage::Pong(m) => m.raw(),
            TypedMessage::Quit(m) => m.raw(),
            TypedMessage::Error(m) => m.raw(),
            TypedMessage::Join(m) => m.raw(),
            TypedMessage::Part(m) => m.raw(),
            TypedMessage::Privmsg(m) => m.raw(),
            TypedMessage::Notice(m) => m.raw(),
            TypedMessage::Welcome(m) => m.raw(),
            TypedMessage::YourHost(m) => m.raw(),
            TypedMessage::Created(m) => m.raw(),
            TypedMessage::MyInfo(m) => m.raw(),
            TypedMessage::ISupport(m) => m.raw(),
            TypedMessage::Bounce(m) => m.raw(),
            TypedMessage::UModeIs(m) => m.raw(),
            TypedMessage::NickError(m) => m.raw(),
            TypedMessage::Extension(m) => m.raw(),
        }
    }

    /// The command word or reply code.
    pub fn command(&self) -> &str {
        &self.raw().command
    }

    /// Downcasts an extension variant.
    pub fn extension<T: ExtensionMessage>(&self) -> Option<&T> {
        match self {
            TypedMessage::Extension(ext) => ext.as_any().downcast_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_count_accepts() {
        assert!(ParamCount::Exactly(2).accepts(2));
        assert!(!ParamCount::Exactly(2).accepts(1));
        assert!(ParamCount::Between(1, 2).accepts(1));
        assert!(ParamCount::Between(1, 2).accepts(2));
        assert!(!ParamCount::Between(1, 2).accepts(3));
        assert!(ParamCount::AtLeast(3).accepts(15));
        assert!(!ParamCount::AtLeast(3).accepts(2));
    }

    #[test]
    fn test_param_count_display() {
        assert_eq!(ParamCount::Exactly(1).to_string(), "1");
        assert_eq!(ParamCount::Between(5, 6).to_string(), "5 to 6");
        assert_eq!(ParamCount::AtLeast(3).to_string(), "at least 3");
    }

    #[test]
    fn test_param_count_check_names_command() {
        let raw = RawMessage::new("PING", Vec::<String>::new());
        let err = ParamCount::Between(1, 2).check(&raw).unwrap_err();
        assert_eq!(err.to_string(), "PING expects 1 to 2 parameter(s), got 0");
    }
}
