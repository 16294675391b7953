//! Live connection handle.
//!
//! A `ConnectionHandle` is the registry's view of one open WebSocket: a
//! bounded outbound queue drained by the connection's writer task, plus the
//! cancellation token shared by the connection's read, write and heartbeat
//! tasks.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tokio_util::sync::CancellationToken;

use super::{error::MessagePushError, value_object::ConnectionId};

/// Frame queued for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushFrame {
    /// Serialized JSON event, shared between all recipients of a broadcast
    Text(Arc<str>),
    /// Protocol-level ping
    Ping,
}

/// Sending half of a connection's outbound queue
pub type PusherChannel = mpsc::Sender<PushFrame>;

#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: PusherChannel,
    cancel: CancellationToken,
}

impl ConnectionHandle {
    pub fn new(sender: PusherChannel, cancel: CancellationToken) -> Self {
        Self {
            id: ConnectionId::generate(),
            sender,
            cancel,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Signal every task of this connection to stop.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.sender.is_closed()
    }

    /// Resolves once the connection has been closed.
    pub async fn closed(&self) {
        self.cancel.cancelled().await;
    }

    /// Enqueue a frame, waiting at most `timeout` for queue capacity.
    pub async fn push(&self, frame: PushFrame, timeout: Duration) -> Result<(), MessagePushError> {
        tokio::select! {
            _ = self.cancel.cancelled() => {
                Err(MessagePushError::ConnectionClosed(self.id.to_string()))
            }
            result = self.sender.send_timeout(frame, timeout) => {
                result.map_err(|e| match e {
                    SendTimeoutError::Timeout(_) => {
                        MessagePushError::WriteTimeout(self.id.to_string())
                    }
                    SendTimeoutError::Closed(_) => {
                        MessagePushError::ConnectionClosed(self.id.to_string())
                    }
                })
            }
        }
    }
}
