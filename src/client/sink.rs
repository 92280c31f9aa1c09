//! The sink table: what to run for each received command or reply code.
//!
//! A sink entry is either a handler or a fatal marker. Fatal markers turn a
//! server reply into a [`ReplyError`] instead of running handlers. Entries for
//! one key run in registration order, built-ins first.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use encoding::Encoding;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{trace, warn};

use crate::casemap::irc_eq;
use crate::command::{MessageVariant, TypedMessage};
use crate::error::{InvalidMessageError, ReplyError};
use crate::message::RawMessage;
use crate::response::Response;

use super::error::{DispatchError, SendError};
use super::events::ClientEvents;
use super::state::{ConnectionState, Phase, ServerInfo};

/// A received message, typed when a variant is registered for it.
#[derive(Debug)]
pub enum InboundMessage {
    /// Built by the registry.
    Typed(TypedMessage),
    /// No variant registered.
    Raw(RawMessage),
}

impl InboundMessage {
    /// The underlying raw message.
    pub fn raw(&self) -> &RawMessage {
        match self {
            InboundMessage::Typed(typed) => typed.raw(),
            InboundMessage::Raw(raw) => raw,
        }
    }

    /// The typed variant, if any.
    pub fn typed(&self) -> Option<&TypedMessage> {
        match self {
            InboundMessage::Typed(typed) => Some(typed),
            InboundMessage::Raw(_) => None,
        }
    }
}

/// Validates an outbound message, reporting a rejection to `events`.
pub(crate) fn serialize_outbound(
    events: &dyn ClientEvents,
    message: &RawMessage,
) -> Result<String, SendError> {
    message
        .serialize()
        .map_err(|err| reject_outbound(events, err, message))
}

fn reject_outbound(
    events: &dyn ClientEvents,
    err: InvalidMessageError,
    message: &RawMessage,
) -> SendError {
    warn!(error = %err, command = %message.command, "rejected outbound message");
    events.on_outbound_violation(&err, message);
    SendError::Invalid(err)
}

/// Handle for queueing outbound lines.
///
/// Validation happens here, on the caller's task; only serialized lines that
/// the connection's encoding can represent reach the queue.
#[derive(Clone)]
pub struct Outbound {
    queue: UnboundedSender<String>,
    events: Arc<dyn ClientEvents>,
    encoding: &'static Encoding,
}

impl Outbound {
    pub(crate) fn new(
        queue: UnboundedSender<String>,
        events: Arc<dyn ClientEvents>,
        encoding: &'static Encoding,
    ) -> Self {
        Outbound {
            queue,
            events,
            encoding,
        }
    }

    /// Serializes `message` and queues it.
    pub fn send(&self, message: RawMessage) -> Result<(), SendError> {
        let line = serialize_outbound(self.events.as_ref(), &message)?;
        self.enqueue(line, &message)
    }

    /// Queues `line`, the serialized form of `message`.
    pub(crate) fn enqueue(&self, line: String, message: &RawMessage) -> Result<(), SendError> {
        let (_, _, unmappable) = self.encoding.encode(&line);
        if unmappable {
            let err = InvalidMessageError::Unencodable {
                encoding: self.encoding.name(),
            };
            return Err(reject_outbound(self.events.as_ref(), err, message));
        }
        trace!(line = %line, ">>");
        self.queue.send(line).map_err(|_| SendError::NotConnected)
    }

    /// Queues a typed message.
    pub fn send_typed<M: MessageVariant>(&self, message: M) -> Result<(), SendError> {
        self.send(message.into_raw())
    }
}

impl fmt::Debug for Outbound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outbound")
            .field("closed", &self.queue.is_closed())
            .finish()
    }
}

/// What a handler may touch while it runs.
///
/// Handlers run while the connection state is write-locked; use
/// [`SinkContext::state`] rather than `Client::state`.
pub struct SinkContext<'a> {
    state: &'a mut ConnectionState,
    outbound: &'a Outbound,
}

impl<'a> SinkContext<'a> {
    pub(crate) fn new(state: &'a mut ConnectionState, outbound: &'a Outbound) -> Self {
        SinkContext { state, outbound }
    }

    /// The connection state.
    pub fn state(&mut self) -> &mut ConnectionState {
        self.state
    }

    /// Queues an outbound message.
    pub fn send(&self, message: RawMessage) -> Result<(), SendError> {
        self.outbound.send(message)
    }

    /// The outbound queue handle, for use outside the handler.
    pub fn outbound(&self) -> Outbound {
        self.outbound.clone()
    }
}

/// A sink handler.
pub type SinkHandler =
    Box<dyn Fn(&mut SinkContext<'_>, &InboundMessage) -> anyhow::Result<()> + Send + Sync>;

enum SinkEntry {
    Handler(SinkHandler),
    Fatal,
}

/// Handlers keyed by uppercase command word or three-digit reply code.
#[derive(Default)]
pub struct SinkTable {
    entries: HashMap<String, Vec<SinkEntry>>,
}

impl SinkTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding the built-in sinks.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.add("001", on_welcome);
        table.add("002", on_your_host);
        table.add("003", on_created);
        table.add("004", on_my_info);
        table.add("NICK", on_nick);
        table.add("PING", on_ping);
        for code in [
            Response::ERR_NONICKNAMEGIVEN,
            Response::ERR_ERRONEOUSNICKNAME,
            Response::ERR_NICKNAMEINUSE,
            Response::ERR_NICKCOLLISION,
        ] {
            table.add_fatal(code);
        }
        table
    }

    fn key(command: &str) -> String {
        command.to_ascii_uppercase()
    }

    /// Appends a handler for `command`.
    pub fn add<F>(&mut self, command: &str, handler: F)
    where
        F: Fn(&mut SinkContext<'_>, &InboundMessage) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.entries
            .entry(Self::key(command))
            .or_default()
            .push(SinkEntry::Handler(Box::new(handler)));
    }

    /// Marks `code` fatal.
    pub fn add_fatal(&mut self, code: Response) {
        self.entries
            .entry(format!("{:03}", code.code()))
            .or_default()
            .push(SinkEntry::Fatal);
    }

    /// Drops every entry for `command`, built-ins included.
    pub fn remove(&mut self, command: &str) {
        self.entries.remove(&Self::key(command));
    }

    /// Whether `command` has any entry.
    pub fn contains(&self, command: &str) -> bool {
        self.entries.contains_key(&Self::key(command))
    }

    /// Whether `command` is marked fatal.
    pub fn is_fatal(&self, command: &str) -> bool {
        self.entries
            .get(&Self::key(command))
            .map_or(false, |entries| {
                entries.iter().any(|e| matches!(e, SinkEntry::Fatal))
            })
    }

    /// Runs the entries for `message`.
    ///
    /// A fatal entry short-circuits with [`DispatchError::Reply`]. Otherwise
    /// handlers run in order and the first failure stops the rest.
    pub fn dispatch(
        &self,
        ctx: &mut SinkContext<'_>,
        message: &InboundMessage,
    ) -> Result<(), DispatchError> {
        let raw = message.raw();
        let Some(entries) = self.entries.get(&Self::key(&raw.command)) else {
            return Ok(());
        };

        if entries.iter().any(|e| matches!(e, SinkEntry::Fatal)) {
            if let Some(code) = raw.reply_code() {
                return Err(DispatchError::Reply(ReplyError {
                    code,
                    message: raw.clone(),
                }));
            }
        }

        for entry in entries {
            if let SinkEntry::Handler(handler) = entry {
                handler(ctx, message)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for SinkTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort_unstable();
        f.debug_struct("SinkTable").field("keys", &keys).finish()
    }
}

fn on_welcome(ctx: &mut SinkContext<'_>, message: &InboundMessage) -> anyhow::Result<()> {
    if let Some(TypedMessage::Welcome(welcome)) = message.typed() {
        let state = ctx.state();
        state.phase = Phase::Registered;
        ServerInfo::set_once(&mut state.server_info.welcome, welcome.text());
        state.self_user.nickname = Some(welcome.client().to_owned());
    }
    Ok(())
}

fn on_your_host(ctx: &mut SinkContext<'_>, message: &InboundMessage) -> anyhow::Result<()> {
    if let Some(TypedMessage::YourHost(reply)) = message.typed() {
        ServerInfo::set_once(&mut ctx.state().server_info.your_host, reply.text());
    }
    Ok(())
}

fn on_created(ctx: &mut SinkContext<'_>, message: &InboundMessage) -> anyhow::Result<()> {
    if let Some(TypedMessage::Created(reply)) = message.typed() {
        ServerInfo::set_once(&mut ctx.state().server_info.created, reply.text());
    }
    Ok(())
}

fn on_my_info(ctx: &mut SinkContext<'_>, message: &InboundMessage) -> anyhow::Result<()> {
    if let Some(TypedMessage::MyInfo(info)) = message.typed() {
        let server = &mut ctx.state().server_info;
        ServerInfo::set_once(&mut server.server_name, info.server_name());
        ServerInfo::set_once(&mut server.version, info.version());
        ServerInfo::set_once(&mut server.user_modes, info.user_modes());
        ServerInfo::set_once(&mut server.channel_modes, info.channel_modes());
    }
    Ok(())
}

fn on_nick(ctx: &mut SinkContext<'_>, message: &InboundMessage) -> anyhow::Result<()> {
    let Some(TypedMessage::Nick(nick)) = message.typed() else {
        return Ok(());
    };
    let Some(source) = nick.source_nickname() else {
        return Ok(());
    };

    let me = &mut ctx.state().self_user.nickname;
    if me.as_deref().map_or(false, |current| irc_eq(current, source)) {
        *me = Some(nick.nickname().to_owned());
    }
    Ok(())
}

fn on_ping(ctx: &mut SinkContext<'_>, message: &InboundMessage) -> anyhow::Result<()> {
    if let Some(TypedMessage::Ping(ping)) = message.typed() {
        ctx.outbound.send_typed(ping.to_pong())?;
    }
    Ok(())
}
