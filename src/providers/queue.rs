//! Queue provider fed by external transport glue
//!
//! The transport's subscribe callback owns a [`QueueSender`] and publishes
//! every delivered message into it; the driver drains the paired
//! [`QueueProvider`] in delivery order.

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::provider::Provider;
use crate::types::InboundMessage;
use crate::{MsgscopeError, Result};

/// Create a bounded sender/provider pair.
///
/// # Panics
///
/// Panics if `capacity` is zero, like [`tokio::sync::mpsc::channel`].
pub fn queue(capacity: usize) -> (QueueSender, QueueProvider) {
    let (tx, rx) = mpsc::channel(capacity);
    (QueueSender { tx }, QueueProvider { rx, received: 0 })
}

/// Publishing half handed to transport glue.
#[derive(Debug, Clone)]
pub struct QueueSender {
    tx: mpsc::Sender<InboundMessage>,
}

impl QueueSender {
    /// Publish a message, waiting for queue capacity.
    pub async fn publish(&self, message: InboundMessage) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| MsgscopeError::channel_closed("subscription dropped its message queue"))
    }

    /// Publish without waiting, for synchronous transport callbacks.
    ///
    /// A full queue is reported as a provider error so the caller can decide
    /// whether to drop the message.
    pub fn try_publish(&self, message: InboundMessage) -> Result<()> {
        self.tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                MsgscopeError::provider_failed("message queue is full")
            }
            mpsc::error::TrySendError::Closed(_) => {
                MsgscopeError::channel_closed("subscription dropped its message queue")
            }
        })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Provider draining a message queue.
#[derive(Debug)]
pub struct QueueProvider {
    rx: mpsc::Receiver<InboundMessage>,
    received: u64,
}

impl QueueProvider {
    /// Messages received so far.
    pub fn received(&self) -> u64 {
        self.received
    }
}

#[async_trait::async_trait]
impl Provider for QueueProvider {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>> {
        match self.rx.recv().await {
            Some(message) => {
                self.received += 1;
                trace!(received = self.received, bytes = message.payload.len(), "Queued message");
                Ok(Some(message))
            }
            None => {
                debug!(received = self.received, "All queue senders dropped");
                Ok(None)
            }
        }
    }
}
