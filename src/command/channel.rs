//! Channel membership messages.

use crate::command::ParamCount;
use crate::message::RawMessage;

message_variant! {
    /// `JOIN <channels> [<keys>]`
    ///
    /// With extended-join a server sends `JOIN <channel> <account> :<realname>`,
    /// hence the third slot.
    pub struct Join: TypedMessage::Join, keys ["JOIN"], params ParamCount::Between(1, 3);
}

impl Join {
    /// Builds `JOIN <channel> [<key>]`.
    pub fn new(channel: impl Into<String>, key: Option<String>) -> Self {
        let mut params = vec![channel.into()];
        params.extend(key);
        Join {
            raw: RawMessage::new("JOIN", params),
        }
    }

    /// The comma-separated channel list as given.
    pub fn channel(&self) -> &str {
        self.arg(0)
    }

    /// Channels being joined.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.arg(0).split(',').filter(|c| !c.is_empty())
    }

    /// Channel keys, when sent by a client.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.raw
            .param(1)
            .unwrap_or("")
            .split(',')
            .filter(|k| !k.is_empty())
    }
}

message_variant! {
    /// `PART <channels> [<reason>]`
    pub struct Part: TypedMessage::Part, keys ["PART"], params ParamCount::Between(1, 2);
}

impl Part {
    /// Builds `PART <channel> [:<reason>]`.
    pub fn new(channel: impl Into<String>, reason: Option<String>) -> Self {
        let mut params = vec![channel.into()];
        params.extend(reason);
        Part {
            raw: RawMessage::new("PART", params),
        }
    }

    /// Channels being left.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.arg(0).split(',').filter(|c| !c.is_empty())
    }

    /// The parting message.
    pub fn reason(&self) -> Option<&str> {
        self.raw.param(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MessageVariant;

    #[test]
    fn test_join_with_key() {
        let join = Join::new("#secret", Some("hunter2".into()));
        assert_eq!(join.serialize().unwrap(), "JOIN #secret hunter2");
        assert_eq!(join.keys().collect::<Vec<_>>(), ["hunter2"]);
    }

    #[test]
    fn test_join_channel_list() {
        let join = Join::from_raw(RawMessage::parse("JOIN #a,#b").unwrap()).unwrap();
        assert_eq!(join.channels().collect::<Vec<_>>(), ["#a", "#b"]);
        assert_eq!(join.keys().count(), 0);
    }

    #[test]
    fn test_extended_join_accepted() {
        let raw = RawMessage::parse(":n!u@h JOIN #a account :Real Name").unwrap();
        assert!(Join::from_raw(raw).is_ok());
    }

    #[test]
    fn test_part_reason() {
        let part = Part::new("#a", Some("see you".into()));
        assert_eq!(part.serialize().unwrap(), "PART #a :see you");
        assert_eq!(part.reason(), Some("see you"));
        assert!(Part::new("#a", None).reason().is_none());
    }
}
