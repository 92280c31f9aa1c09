//! Convenience senders for common commands.

use crate::command::{Join, Nick, Notice, Part, Pass, Ping, Pong, Privmsg, Quit, User};
use crate::ctcp::CtcpMessage;

use super::error::SendError;
use super::Client;

impl Client {
    /// `NICK <nickname>`
    pub fn nick(&self, nickname: &str) -> Result<(), SendError> {
        self.send_typed(Nick::new(nickname))
    }

    /// `USER <username> 0 * :<realname>`
    pub fn user(&self, username: &str, realname: &str) -> Result<(), SendError> {
        self.send_typed(User::new(username, realname))
    }

    /// `PASS <password>`
    pub fn pass(&self, password: &str) -> Result<(), SendError> {
        self.send_typed(Pass::new(password))
    }

    /// `JOIN <channel> [<key>]`
    pub fn join(&self, channel: &str, key: Option<&str>) -> Result<(), SendError> {
        self.send_typed(Join::new(channel, key.map(str::to_owned)))
    }

    /// `PART <channel> [:<reason>]`
    pub fn part(&self, channel: &str, reason: Option<&str>) -> Result<(), SendError> {
        self.send_typed(Part::new(channel, reason.map(str::to_owned)))
    }

    /// `QUIT [:<reason>]`
    pub fn quit(&self, reason: Option<&str>) -> Result<(), SendError> {
        self.send_typed(Quit::new(reason.map(str::to_owned)))
    }

    /// `PING <token>`
    pub fn ping(&self, token: &str) -> Result<(), SendError> {
        self.send_typed(Ping::new(token))
    }

    /// `PONG <token>`
    pub fn pong(&self, token: &str) -> Result<(), SendError> {
        self.send_typed(Pong::new(token))
    }

    /// `PRIVMSG <targets> :<text>` with the targets comma-joined.
    pub fn privmsg<I, S>(&self, targets: I, text: &str) -> Result<(), SendError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.send_typed(Privmsg::new(targets, text))
    }

    /// `NOTICE <targets> :<text>` with the targets comma-joined.
    pub fn notice<I, S>(&self, targets: I, text: &str) -> Result<(), SendError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.send_typed(Notice::new(targets, text))
    }

    /// Sends `message` as a CTCP query (PRIVMSG).
    pub fn ctcp_query<I, S>(&self, targets: I, message: &CtcpMessage) -> Result<(), SendError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.send(message.to_query(targets)?)
    }

    /// Sends `message` as a CTCP reply (NOTICE).
    pub fn ctcp_reply<I, S>(&self, targets: I, message: &CtcpMessage) -> Result<(), SendError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.send(message.to_reply(targets)?)
    }

    /// `/me`: a CTCP ACTION to `target`.
    pub fn action(&self, target: &str, text: &str) -> Result<(), SendError> {
        self.ctcp_query([target], &CtcpMessage::action(text))
    }
}
