//! Replay provider for recorded messages

use std::collections::VecDeque;
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::provider::Provider;
use crate::types::InboundMessage;
use crate::{MsgscopeError, Result};

/// Replay provider that yields a recorded message list
///
/// Without a rate, messages are yielded as fast as the driver pulls them.
/// With a rate, delivery is paced by a tokio interval.
pub struct ReplayProvider {
    messages: VecDeque<InboundMessage>,
    total: usize,
    rate_hz: Option<f64>,
    /// Created on first use so the provider can be built outside a runtime
    interval: Option<Interval>,
}

impl ReplayProvider {
    /// Unpaced replay of `messages`.
    pub fn new(messages: impl IntoIterator<Item = InboundMessage>) -> Self {
        let messages: VecDeque<_> = messages.into_iter().collect();
        let total = messages.len();
        info!(messages = total, "Replay prepared");
        Self { messages, total, rate_hz: None, interval: None }
    }

    /// Pace delivery at `hz` messages per second.
    pub fn with_rate(mut self, hz: f64) -> Result<Self> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(MsgscopeError::parse_error(
                "replay rate",
                format!("rate must be a positive number of Hz, got {hz}"),
            ));
        }
        self.rate_hz = Some(hz);
        self.interval = None;
        debug!(hz, "Replay pacing set");
        Ok(self)
    }

    /// Replay several payloads that share one message's definition.
    pub fn from_payloads(
        template: &InboundMessage,
        payloads: impl IntoIterator<Item = Vec<u8>>,
    ) -> Self {
        Self::new(payloads.into_iter().map(|payload| template.with_payload(payload)))
    }

    /// Messages not yet delivered.
    pub fn remaining(&self) -> usize {
        self.messages.len()
    }

    /// Total replay duration at the configured rate.
    pub fn duration(&self) -> Option<Duration> {
        self.rate_hz.map(|hz| Duration::from_secs_f64(self.total as f64 / hz))
    }
}

#[async_trait::async_trait]
impl Provider for ReplayProvider {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>> {
        if self.messages.is_empty() {
            debug!(total = self.total, "Reached end of replay");
            return Ok(None);
        }

        if let Some(hz) = self.rate_hz {
            let pacing = self.interval.get_or_insert_with(|| {
                let mut pacing = interval(Duration::from_secs_f64(1.0 / hz));
                pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);
                pacing
            });
            pacing.tick().await;
        }

        let message = self.messages.pop_front();
        trace!(position = self.total - self.messages.len(), total = self.total, "Replayed message");
        Ok(message)
    }

    fn source_rate(&self) -> Option<f64> {
        self.rate_hz
    }
}
