//! Connection registration and liveness messages.

use crate::command::ParamCount;
use crate::message::RawMessage;

message_variant! {
    /// `PASS <password>`
    pub struct Pass: TypedMessage::Pass, keys ["PASS"], params ParamCount::Exactly(1);
}

impl Pass {
    /// Builds `PASS <password>`.
    pub fn new(password: impl Into<String>) -> Self {
        Pass {
            raw: RawMessage::new("PASS", [password.into()]),
        }
    }

    /// The connection password.
    pub fn password(&self) -> &str {
        self.arg(0)
    }
}

message_variant! {
    /// `NICK <nickname>`
    ///
    /// Inbound, the prefix names the user whose nickname changed.
    pub struct Nick: TypedMessage::Nick, keys ["NICK"], params ParamCount::Exactly(1);
}

impl Nick {
    /// Builds `NICK <nickname>`.
    pub fn new(nickname: impl Into<String>) -> Self {
        Nick {
            raw: RawMessage::new("NICK", [nickname.into()]),
        }
    }

    /// The new nickname.
    pub fn nickname(&self) -> &str {
        self.arg(0)
    }

    /// Replaces the nickname.
    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.set_arg(0, nickname.into());
    }
}

message_variant! {
    /// `USER <username> <mode> <unused> <realname>`
    pub struct User: TypedMessage::User, keys ["USER"], params ParamCount::Exactly(4);
}

impl User {
    /// Builds `USER <username> 0 * :<realname>`.
    pub fn new(username: impl Into<String>, realname: impl Into<String>) -> Self {
        User {
            raw: RawMessage::new(
                "USER",
                [username.into(), "0".to_owned(), "*".to_owned(), realname.into()],
            ),
        }
    }

    /// The username.
    pub fn username(&self) -> &str {
        self.arg(0)
    }

    /// The requested user mode bitmask.
    pub fn mode(&self) -> &str {
        self.arg(1)
    }

    /// The real name.
    pub fn realname(&self) -> &str {
        self.arg(3)
    }
}

message_variant! {
    /// `PING <token> [<server>]`
    pub struct Ping: TypedMessage::Ping, keys ["PING"], params ParamCount::Between(1, 2);
}

impl Ping {
    /// Builds `PING <token>`.
    pub fn new(token: impl Into<String>) -> Self {
        Ping {
            raw: RawMessage::new("PING", [token.into()]),
        }
    }

    /// The token a PONG must echo.
    pub fn token(&self) -> &str {
        self.arg(0)
    }

    /// Replaces the token.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.set_arg(0, token.into());
    }

    /// The reply this ping asks for.
    pub fn to_pong(&self) -> Pong {
        Pong::new(self.token())
    }
}

message_variant! {
    /// `PONG [<server>] <token>`
    pub struct Pong: TypedMessage::Pong, keys ["PONG"], params ParamCount::Between(1, 2);
}

impl Pong {
    /// Builds `PONG <token>`.
    pub fn new(token: impl Into<String>) -> Self {
        Pong {
            raw: RawMessage::new("PONG", [token.into()]),
        }
    }

    /// The echoed token; servers put it last.
    pub fn token(&self) -> &str {
        self.raw.trailing().unwrap_or("")
    }
}

message_variant! {
    /// `QUIT [<reason>]`
    pub struct Quit: TypedMessage::Quit, keys ["QUIT"], params ParamCount::Between(0, 1);
}

impl Quit {
    /// Builds `QUIT` with an optional reason.
    pub fn new(reason: Option<String>) -> Self {
        Quit {
            raw: RawMessage::new("QUIT", reason),
        }
    }

    /// The quit reason.
    pub fn reason(&self) -> Option<&str> {
        self.raw.param(0)
    }

    /// Sets or clears the reason.
    pub fn set_reason(&mut self, reason: Option<String>) {
        self.raw.params = reason.into_iter().collect();
    }
}

message_variant! {
    /// `ERROR <message>`: the server is closing the link.
    pub struct ErrorMessage: TypedMessage::Error, keys ["ERROR"], params ParamCount::Exactly(1);
}

impl ErrorMessage {
    /// The server's explanation.
    pub fn message(&self) -> &str {
        self.arg(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MessageVariant;
    use crate::error::InvalidMessageError;

    #[test]
    fn test_user_builds_standard_form() {
        let user = User::new("guest", "Real Name");
        assert_eq!(user.serialize().unwrap(), "USER guest 0 * :Real Name");
        assert_eq!(user.username(), "guest");
        assert_eq!(user.realname(), "Real Name");
    }

    #[test]
    fn test_ping_requires_token() {
        let raw = RawMessage::new("PING", Vec::<String>::new());
        match Ping::from_raw(raw) {
            Err(InvalidMessageError::WrongParameterCount { expected, got, .. }) => {
                assert_eq!(expected.min(), 1);
                assert_eq!(got, 0);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_ping_to_pong() {
        let ping = Ping::from_raw(RawMessage::parse("PING :irc.example.net").unwrap()).unwrap();
        let pong = ping.to_pong();
        assert_eq!(pong.serialize().unwrap(), "PONG irc.example.net");
    }

    #[test]
    fn test_pong_token_is_last() {
        let pong = Pong::from_raw(RawMessage::parse(":srv PONG srv :abc").unwrap()).unwrap();
        assert_eq!(pong.token(), "abc");
    }

    #[test]
    fn test_quit_reason() {
        let mut quit = Quit::new(None);
        assert_eq!(quit.serialize().unwrap(), "QUIT");
        quit.set_reason(Some("bye now".into()));
        assert_eq!(quit.reason(), Some("bye now"));
        assert_eq!(quit.serialize().unwrap(), "QUIT :bye now");
    }

    #[test]
    fn test_nick_setter() {
        let mut nick = Nick::new("a");
        nick.set_nickname("b");
        assert_eq!(nick.nickname(), "b");
    }
}
