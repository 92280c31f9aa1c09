//! PRIVMSG and NOTICE.

use crate::command::ParamCount;
use crate::message::RawMessage;

fn join_targets<I, S>(targets: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for target in targets {
        if !out.is_empty() {
            out.push(',');
        }
        out.push_str(target.as_ref());
    }
    out
}

message_variant! {
    /// `PRIVMSG <targets> <text>`
    pub struct Privmsg: TypedMessage::Privmsg, keys ["PRIVMSG"], params ParamCount::Exactly(2);
}

impl Privmsg {
    /// Builds a PRIVMSG to one or more comma-joined targets.
    pub fn new<I, S>(targets: I, text: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Privmsg {
            raw: RawMessage::new("PRIVMSG", [join_targets(targets), text.into()]),
        }
    }

    /// Message targets.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.arg(0).split(',').filter(|t| !t.is_empty())
    }

    /// The message text.
    pub fn text(&self) -> &str {
        self.arg(1)
    }

    /// Replaces the text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.set_arg(1, text.into());
    }
}

message_variant! {
    /// `NOTICE <targets> <text>`. Automated replies use NOTICE so that they
    /// never trigger further automated replies.
    pub struct Notice: TypedMessage::Notice, keys ["NOTICE"], params ParamCount::Exactly(2);
}

impl Notice {
    /// Builds a NOTICE to one or more comma-joined targets.
    pub fn new<I, S>(targets: I, text: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Notice {
            raw: RawMessage::new("NOTICE", [join_targets(targets), text.into()]),
        }
    }

    /// Message targets.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.arg(0).split(',').filter(|t| !t.is_empty())
    }

    /// The notice text.
    pub fn text(&self) -> &str {
        self.arg(1)
    }

    /// Replaces the text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.set_arg(1, text.into());
    }
}
