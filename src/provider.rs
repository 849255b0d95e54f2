//! Provider trait for message sources

use crate::Result;
use crate::types::InboundMessage;

/// Trait for message sources
///
/// Providers abstract over the transport that actually delivers messages
/// (a queue fed by subscriber glue, a recorded replay, a network bridge) and
/// handle their own timing internally.
#[async_trait::async_trait]
pub trait Provider: Send + 'static {
    /// Get the next message for the channel
    ///
    /// Returns:
    /// - `Ok(Some(message))` - New message available
    /// - `Ok(None)` - Source ended (normal termination)
    /// - `Err(e)` - Transport error; the driver backs off and retries
    async fn next_message(&mut self) -> Result<Option<InboundMessage>>;

    /// Native message rate in Hz, if the source has a fixed one
    ///
    /// Used to decide whether a requested maximum rate needs throttling.
    fn source_rate(&self) -> Option<f64> {
        None
    }
}

#[async_trait::async_trait]
impl<P: Provider + ?Sized> Provider for Box<P> {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>> {
        (**self).next_message().await
    }

    fn source_rate(&self) -> Option<f64> {
        (**self).source_rate()
    }
}
