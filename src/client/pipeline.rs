//! The per-connection read and send tasks.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, trace, warn};

use crate::ctcp::CtcpMessage;
use crate::line::LineCodec;
use crate::message::RawMessage;
use crate::response::Response;

use super::error::{DispatchError, InboundViolation};
use super::sink::{InboundMessage, Outbound, SinkContext};
use super::Inner;

/// Ends the session when the read task stops, however it stops.
struct EndSession {
    inner: Arc<Inner>,
    session: u64,
}

impl Drop for EndSession {
    fn drop(&mut self) {
        self.inner.end_session(self.session, false);
    }
}

/// Reads lines until the stream ends, dispatching each one.
pub(crate) async fn read_loop<R>(
    inner: Arc<Inner>,
    session: u64,
    mut lines: FramedRead<R, LineCodec>,
    outbound: Outbound,
) where
    R: AsyncRead + Unpin,
{
    let _end = EndSession {
        inner: Arc::clone(&inner),
        session,
    };

    loop {
        match lines.next().await {
            Some(Ok(Ok(line))) => handle_line(&inner, &outbound, line),
            Some(Ok(Err(err))) => match InboundViolation::from_codec(err) {
                Some(violation) => {
                    warn!(%violation, "skipping inbound line");
                    inner.events.on_inbound_violation(&violation);
                }
                None => break,
            },
            Some(Err(err)) => {
                debug!(error = %err, "read failed");
                break;
            }
            None => break,
        }
    }

    drop(outbound);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

fn handle_line(inner: &Inner, outbound: &Outbound, line: String) {
    trace!(line = %line, "<<");

    let raw = match RawMessage::parse(&line) {
        Ok(raw) => raw,
        Err(error) => {
            let violation = InboundViolation::Malformed { line, error };
            warn!(%violation, "skipping inbound line");
            inner.events.on_inbound_violation(&violation);
            return;
        }
    };

    inner.events.on_message(&raw);

    match inner.registry.create_instance(raw.clone()) {
        Ok(typed) => {
            let message = match typed {
                Some(typed) => InboundMessage::Typed(typed),
                None => InboundMessage::Raw(raw.clone()),
            };
            // The state lock guard is released while unwinding.
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut state = inner.state.write();
                let mut ctx = SinkContext::new(&mut state, outbound);
                inner.sinks.dispatch(&mut ctx, &message)
            }))
            .unwrap_or_else(|payload| Err(DispatchError::Panicked(panic_message(payload.as_ref()))));

            match result {
                Ok(()) => {}
                Err(DispatchError::Reply(reply)) => {
                    debug!(code = %reply.code, "error reply");
                    inner.settle_registration(Err(reply.clone()));
                    inner.events.on_error_reply(&reply);
                }
                Err(err @ DispatchError::Panicked(_)) => {
                    warn!(error = %err, command = %raw.command, "dispatch failed");
                    inner.events.on_dispatch_failure(&err, &raw);
                }
                Err(err) => {
                    debug!(error = %err, command = %raw.command, "dispatch failed");
                    inner.events.on_dispatch_failure(&err, &raw);
                }
            }

            if raw.reply_code() == Some(Response::RPL_WELCOME) && inner.state.read().is_registered() {
                inner.settle_registration(Ok(()));
            }
        }
        Err(err) => {
            let err = DispatchError::Invalid(err);
            debug!(error = %err, command = %raw.command, "dispatch failed");
            inner.events.on_dispatch_failure(&err, &raw);
        }
    }

    if let Some(ctcp) = CtcpMessage::try_extract(&raw) {
        inner.events.on_ctcp(&ctcp);
    }
}

/// Writes queued lines until the queue closes or a write fails.
///
/// Each wake-up drains everything already queued and flushes once.
pub(crate) async fn send_loop<W>(mut sink: FramedWrite<W, LineCodec>, mut queue: UnboundedReceiver<String>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = queue.recv().await {
        if let Err(err) = sink.feed(line).await {
            debug!(error = %err, "write failed");
            return;
        }
        while let Ok(line) = queue.try_recv() {
            if let Err(err) = sink.feed(line).await {
                debug!(error = %err, "write failed");
                return;
            }
        }
        if let Err(err) = sink.flush().await {
            debug!(error = %err, "flush failed");
            return;
        }
    }
    // Best effort; the peer may already be gone.
    let _ = sink.close().await;
}
