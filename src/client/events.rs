//! Signals the pipeline raises.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::ctcp::CtcpMessage;
use crate::error::{InvalidMessageError, ReplyError};
use crate::message::RawMessage;

use super::error::{DispatchError, InboundViolation};

/// Observer for connection activity.
///
/// Every method has an empty default. Callbacks run on the connection's read
/// task (or the caller's task for outbound violations) and must not block.
///
/// When a sink handler sends an invalid message,
/// [`on_outbound_violation`](Self::on_outbound_violation) runs inside that
/// handler, while the connection state is write-locked. From there, calling
/// anything that locks the state (`Client::state`, `Client::is_connected`,
/// `Client::is_registered`, `Client::register`) deadlocks the read task.
/// Forward the signal instead, as [`ChannelEvents`] does. The other callbacks
/// run with the state unlocked.
pub trait ClientEvents: Send + Sync {
    /// The stream is up and the pipeline is running.
    fn on_connected(&self) {}

    /// The stream ended. Fired once per connection.
    fn on_disconnected(&self) {}

    /// A line was tokenized. Runs before any sink.
    fn on_message(&self, _message: &RawMessage) {}

    /// Typed construction or a sink handler failed.
    fn on_dispatch_failure(&self, _error: &DispatchError, _message: &RawMessage) {}

    /// A received line was skipped.
    fn on_inbound_violation(&self, _violation: &InboundViolation) {}

    /// An outbound message was rejected before reaching the wire. May run
    /// with the connection state locked; see the trait docs.
    fn on_outbound_violation(&self, _error: &InvalidMessageError, _message: &RawMessage) {}

    /// A fatal sink matched a server reply.
    fn on_error_reply(&self, _error: &ReplyError) {}

    /// A PRIVMSG or NOTICE carried a CTCP message.
    fn on_ctcp(&self, _message: &CtcpMessage) {}
}

/// Ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEvents;

impl ClientEvents for NoEvents {}

/// An owned copy of one signal.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Event {
    /// See [`ClientEvents::on_connected`].
    Connected,
    /// See [`ClientEvents::on_disconnected`].
    Disconnected,
    /// See [`ClientEvents::on_message`].
    Message(RawMessage),
    /// See [`ClientEvents::on_dispatch_failure`]. The error is rendered as
    /// text.
    DispatchFailure {
        /// The failure.
        error: String,
        /// The message being dispatched.
        message: RawMessage,
    },
    /// See [`ClientEvents::on_inbound_violation`].
    InboundViolation(InboundViolation),
    /// See [`ClientEvents::on_outbound_violation`].
    OutboundViolation {
        /// Why the message was rejected.
        error: InvalidMessageError,
        /// The rejected message.
        message: RawMessage,
    },
    /// See [`ClientEvents::on_error_reply`].
    ErrorReply(ReplyError),
    /// See [`ClientEvents::on_ctcp`].
    Ctcp(CtcpMessage),
}

/// Forwards every signal into an unbounded channel.
///
/// ```no_run
/// # async fn demo() {
/// use slirc_client::client::{ChannelEvents, Client, Event};
///
/// let (events, mut rx) = ChannelEvents::new();
/// let client = Client::builder().events(events).build();
/// while let Some(event) = rx.recv().await {
///     if event == Event::Disconnected {
///         break;
///     }
/// }
/// # drop(client);
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ChannelEvents {
    tx: UnboundedSender<Event>,
}

impl ChannelEvents {
    /// Creates the forwarder and its receiving end.
    pub fn new() -> (Self, UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelEvents { tx }, rx)
    }

    /// Wraps an existing sender.
    pub fn from_sender(tx: UnboundedSender<Event>) -> Self {
        ChannelEvents { tx }
    }

    fn emit(&self, event: Event) {
        // A dropped receiver just means nobody is listening.
        let _ = self.tx.send(event);
    }
}

impl ClientEvents for ChannelEvents {
    fn on_connected(&self) {
        self.emit(Event::Connected);
    }

    fn on_disconnected(&self) {
        self.emit(Event::Disconnected);
    }

    fn on_message(&self, message: &RawMessage) {
        self.emit(Event::Message(message.clone()));
    }

    fn on_dispatch_failure(&self, error: &DispatchError, message: &RawMessage) {
        self.emit(Event::DispatchFailure {
            error: error.to_string(),
            message: message.clone(),
        });
    }

    fn on_inbound_violation(&self, violation: &InboundViolation) {
        self.emit(Event::InboundViolation(violation.clone()));
    }

    fn on_outbound_violation(&self, error: &InvalidMessageError, message: &RawMessage) {
        self.emit(Event::OutboundViolation {
            error: error.clone(),
            message: message.clone(),
        });
    }

    fn on_error_reply(&self, error: &ReplyError) {
        self.emit(Event::ErrorReply(error.clone()));
    }

    fn on_ctcp(&self, message: &CtcpMessage) {
        self.emit(Event::Ctcp(message.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_events_forward() {
        let (events, mut rx) = ChannelEvents::new();
        events.on_connected();
        events.on_message(&RawMessage::new("PING", ["x"]));
        events.on_disconnected();

        assert_eq!(rx.try_recv().unwrap(), Event::Connected);
        assert_eq!(
            rx.try_recv().unwrap(),
            Event::Message(RawMessage::new("PING", ["x"]))
        );
        assert_eq!(rx.try_recv().unwrap(), Event::Disconnected);
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (events, rx) = ChannelEvents::new();
        drop(rx);
        events.on_connected();
    }
}
