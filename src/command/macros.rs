/// Declares a variant struct wrapping a `RawMessage`.
///
/// ```ignore
/// message_variant! {
///     /// `PING <token> [<server>]`
///     pub struct Ping: TypedMessage::Ping, keys ["PING"], params ParamCount::Between(1, 2);
/// }
/// ```
///
/// An optional `check path::to::fn` runs after the count check.
macro_rules! message_variant {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: TypedMessage::$variant:ident,
        keys [$($key:literal),+ $(,)?],
        params $count:expr
        $(, check $check:path)?;
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            raw: $crate::message::RawMessage,
        }

        impl $crate::command::MessageVariant for $name {
            const KEYS: &'static [&'static str] = &[$($key),+];
            const PARAMS: $crate::command::ParamCount = $count;

            fn validate(
                raw: &$crate::message::RawMessage,
            ) -> Result<(), $crate::error::InvalidMessageError> {
                Self::PARAMS.check(raw)?;
                $( $check(raw)?; )?
                Ok(())
            }

            fn wrap(raw: $crate::message::RawMessage) -> Self {
                $name { raw }
            }

            fn raw(&self) -> &$crate::message::RawMessage {
                &self.raw
            }

            fn into_raw(self) -> $crate::message::RawMessage {
                self.raw
            }
        }

        #[allow(dead_code)]
        impl $name {
            /// Parameter `index`, or `""` when absent.
            #[inline]
            fn arg(&self, index: usize) -> &str {
                self.raw.param(index).unwrap_or("")
            }

            /// Replaces parameter `index` if present.
            #[inline]
            fn set_arg(&mut self, index: usize, value: String) {
                if let Some(slot) = self.raw.params.get_mut(index) {
                    *slot = value;
                }
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::message::RawMessage;

            fn deref(&self) -> &Self::Target {
                &self.raw
            }
        }

        impl From<$name> for $crate::command::TypedMessage {
            fn from(msg: $name) -> Self {
                $crate::command::TypedMessage::$variant(msg)
            }
        }

        impl From<$name> for $crate::message::RawMessage {
            fn from(msg: $name) -> Self {
                msg.raw
            }
        }

        impl TryFrom<$crate::message::RawMessage> for $name {
            type Error = $crate::error::InvalidMessageError;

            fn try_from(raw: $crate::message::RawMessage) -> Result<Self, Self::Error> {
                <$name as $crate::command::MessageVariant>::from_raw(raw)
            }
        }
    };
}
