//! Command word and reply code to typed variant lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{InvalidMessageError, RegistryError};
use crate::message::RawMessage;

use super::*;

/// Checks a raw message against a variant's rules.
pub type Validator = fn(&RawMessage) -> Result<(), InvalidMessageError>;

/// Wraps an already validated raw message.
pub type Builder = fn(RawMessage) -> TypedMessage;

#[derive(Clone, Copy)]
struct Entry {
    validate: Validator,
    build: Builder,
}

fn build_variant<V: MessageVariant>(raw: RawMessage) -> TypedMessage {
    V::wrap(raw).into()
}

/// Maps command words and three-digit reply codes to typed variants.
///
/// Keys are matched without regard to ASCII case. A message whose command has
/// no entry stays raw; that is not an error.
///
/// ```
/// use slirc_client::{MessageRegistry, RawMessage, TypedMessage};
///
/// let raw = RawMessage::parse("PING :abc").unwrap();
/// let typed = MessageRegistry::global().create_instance(raw).unwrap();
/// assert!(matches!(typed, Some(TypedMessage::Ping(_))));
/// ```
#[derive(Clone, Default)]
pub struct MessageRegistry {
    entries: HashMap<String, Entry>,
}

static GLOBAL: OnceLock<MessageRegistry> = OnceLock::new();

impl MessageRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in variant.
    ///
    /// Fails if two built-ins claim the same key.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.try_register_variant::<Pass>()?;
        registry.try_register_variant::<Nick>()?;
        registry.try_register_variant::<User>()?;
        registry.try_register_variant::<Ping>()?;
        registry.try_register_variant::<Pong>()?;
        registry.try_register_variant::<Quit>()?;
        registry.try_register_variant::<ErrorMessage>()?;
        registry.try_register_variant::<Join>()?;
        registry.try_register_variant::<Part>()?;
        registry.try_register_variant::<Privmsg>()?;
        registry.try_register_variant::<Notice>()?;
        registry.try_register_variant::<Welcome>()?;
        registry.try_register_variant::<YourHost>()?;
        registry.try_register_variant::<Created>()?;
        registry.try_register_variant::<MyInfo>()?;
        registry.try_register_variant::<ISupport>()?;
        registry.try_register_variant::<Bounce>()?;
        registry.try_register_variant::<UModeIs>()?;
        registry.try_register_variant::<NickError>()?;
        Ok(registry)
    }

    /// The process-wide built-in registry, built on first use.
    ///
    /// [`RawMessage::serialize`] validates against this registry.
    pub fn global() -> &'static MessageRegistry {
        // Every built-in variant claims its own keys, so `builtin` cannot hit
        // a duplicate.
        GLOBAL.get_or_init(|| {
            MessageRegistry::builtin().expect("built-in message variants have distinct keys")
        })
    }

    fn normalize(key: &str) -> String {
        key.to_ascii_uppercase()
    }

    /// Registers `key`, replacing any existing entry.
    pub fn register(&mut self, key: &str, validate: Validator, build: Builder) {
        self.entries
            .insert(Self::normalize(key), Entry { validate, build });
    }

    /// Registers `key`, failing if it is already taken.
    pub fn try_register(
        &mut self,
        key: &str,
        validate: Validator,
        build: Builder,
    ) -> Result<(), RegistryError> {
        let key = Self::normalize(key);
        if self.entries.contains_key(&key) {
            return Err(RegistryError::Duplicate(key));
        }
        self.entries.insert(key, Entry { validate, build });
        Ok(())
    }

    /// Registers every key of `V`, replacing existing entries.
    pub fn register_variant<V: MessageVariant>(&mut self) {
        for key in V::KEYS {
            self.register(key, V::validate, build_variant::<V>);
        }
    }

    /// Registers every key of `V`, failing on the first key already taken.
    pub fn try_register_variant<V: MessageVariant>(&mut self) -> Result<(), RegistryError> {
        for key in V::KEYS {
            self.try_register(key, V::validate, build_variant::<V>)?;
        }
        Ok(())
    }

    /// Whether `command` has an entry.
    pub fn contains(&self, command: &str) -> bool {
        self.entries.contains_key(&Self::normalize(command))
    }

    /// Registered keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Runs the registered variant's checks. Unregistered commands pass.
    pub fn validate(&self, raw: &RawMessage) -> Result<(), InvalidMessageError> {
        match self.entries.get(&Self::normalize(&raw.command)) {
            Some(entry) => (entry.validate)(raw),
            None => Ok(()),
        }
    }

    /// Builds the typed variant for `raw`.
    ///
    /// `Ok(None)` means no variant is registered for the command. A registered
    /// variant that rejects the message yields its validation error.
    pub fn create_instance(
        &self,
        raw: RawMessage,
    ) -> Result<Option<TypedMessage>, InvalidMessageError> {
        match self.entries.get(&Self::normalize(&raw.command)) {
            Some(entry) => {
                (entry.validate)(&raw)?;
                Ok(Some((entry.build)(raw)))
            }
            None => Ok(None),
        }
    }
}

impl fmt::Debug for MessageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("MessageRegistry").field("keys", &keys).finish()
    }
}
