//! Numeric replies sent during and right after registration.

use crate::command::ParamCount;
use crate::error::InvalidMessageError;
use crate::message::RawMessage;
use crate::response::Response;

message_variant! {
    /// `001 <client> :Welcome to the network`
    pub struct Welcome: TypedMessage::Welcome, keys ["001"], params ParamCount::Exactly(2);
}

impl Welcome {
    /// The nickname the server registered us under.
    pub fn client(&self) -> &str {
        self.arg(0)
    }

    /// The welcome text.
    pub fn text(&self) -> &str {
        self.arg(1)
    }
}

message_variant! {
    /// `002 <client> :Your host is ...`
    pub struct YourHost: TypedMessage::YourHost, keys ["002"], params ParamCount::Exactly(2);
}

impl YourHost {
    /// The reply text.
    pub fn text(&self) -> &str {
        self.arg(1)
    }
}

message_variant! {
    /// `003 <client> :This server was created ...`
    pub struct Created: TypedMessage::Created, keys ["003"], params ParamCount::Exactly(2);
}

impl Created {
    /// The reply text.
    pub fn text(&self) -> &str {
        self.arg(1)
    }
}

message_variant! {
    /// `004 <client> <servername> <version> <usermodes> <chanmodes> [<chanmodes with param>]`
    pub struct MyInfo: TypedMessage::MyInfo, keys ["004"], params ParamCount::AtLeast(5);
}

impl MyInfo {
    /// Server name.
    pub fn server_name(&self) -> &str {
        self.arg(1)
    }

    /// Server software version.
    pub fn version(&self) -> &str {
        self.arg(2)
    }

    /// Available user modes.
    pub fn user_modes(&self) -> &str {
        self.arg(3)
    }

    /// Available channel modes.
    pub fn channel_modes(&self) -> &str {
        self.arg(4)
    }

    /// Channel modes that take a parameter, when advertised.
    pub fn channel_modes_with_param(&self) -> Option<&str> {
        self.raw.param(5)
    }
}

message_variant! {
    /// `005 <client> <token>{ <token>} :are supported by this server`
    pub struct ISupport: TypedMessage::ISupport, keys ["005"], params ParamCount::Between(3, 15);
}

impl ISupport {
    /// Advertised tokens as `(name, value)`. A `-NAME` token keeps its dash.
    pub fn tokens(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        let end = self.raw.params.len().saturating_sub(1);
        self.raw.params[1.min(end)..end].iter().map(|token| {
            match token.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (token.as_str(), None),
            }
        })
    }
}

fn check_bounce(raw: &RawMessage) -> Result<(), InvalidMessageError> {
    let port = raw.param(2).unwrap_or("");
    match port.parse::<u16>() {
        Ok(_) => Ok(()),
        Err(_) => Err(InvalidMessageError::InvalidArgument {
            command: raw.command.clone(),
            reason: format!("{:?} is not a port number", port),
        }),
    }
}

message_variant! {
    /// `010 <client> <hostname> <port> [:<info>]`: try another server.
    pub struct Bounce: TypedMessage::Bounce, keys ["010"], params ParamCount::Between(3, 4),
        check check_bounce;
}

impl Bounce {
    /// Server to reconnect to.
    pub fn hostname(&self) -> &str {
        self.arg(1)
    }

    /// Port to reconnect to.
    pub fn port(&self) -> u16 {
        self.arg(2).parse().unwrap_or(0)
    }

    /// Free-form info text.
    pub fn info(&self) -> Option<&str> {
        self.raw.param(3)
    }
}

message_variant! {
    /// `221 <client> <modes>`
    pub struct UModeIs: TypedMessage::UModeIs, keys ["221"], params ParamCount::Exactly(2);
}

impl UModeIs {
    /// Current user modes.
    pub fn modes(&self) -> &str {
        self.arg(1)
    }
}

message_variant! {
    /// Nickname rejections: `431 <client> :reason` and
    /// `432`/`433`/`436 <client> <nick> :reason`.
    pub struct NickError: TypedMessage::NickError, keys ["431", "432", "433", "436"],
        params ParamCount::Between(2, 3);
}

impl NickError {
    /// Which rejection this is.
    pub fn code(&self) -> Option<Response> {
        self.raw.reply_code()
    }

    /// The rejected nickname, absent for `431`.
    pub fn nickname(&self) -> Option<&str> {
        match self.raw.parameter_count() {
            3 => self.raw.param(1),
            _ => None,
        }
    }

    /// The server's explanation.
    pub fn reason(&self) -> &str {
        self.raw.trailing().unwrap_or("")
    }
}
