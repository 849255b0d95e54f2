//! Driver spawns and manages the message processing task

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, trace, warn};

use crate::channel::Channel;
use crate::config::SubscriberConfig;
use crate::provider::Provider;
use crate::types::{DecodedRecord, InboundMessage};

/// Application callback invoked once per decoded message
///
/// The serialized bytes are available as [`DecodedRecord::payload`].
/// Errors are logged and counted; they never stop the driver.
pub trait Consumer: Send + 'static {
    fn consume(&mut self, record: &DecodedRecord) -> anyhow::Result<()>;
}

impl<F> Consumer for F
where
    F: FnMut(&DecodedRecord) -> anyhow::Result<()> + Send + 'static,
{
    fn consume(&mut self, record: &DecodedRecord) -> anyhow::Result<()> {
        self(record)
    }
}

/// Consumer that ignores every record; records are still published to streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl Consumer for Discard {
    fn consume(&mut self, _record: &DecodedRecord) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Lifecycle of the driver task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    #[default]
    Running,
    /// Provider reported the end of its stream
    Ended,
    /// Stopped through the cancellation token
    Cancelled,
    /// Gave up after too many consecutive provider errors
    Failed,
}

/// Counters published by the driver after every message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub state: DriverState,
    /// Messages received from the provider
    pub received: u64,
    /// Messages decoded and handed to the consumer
    pub decoded: u64,
    /// Messages dropped because initialization or decoding failed
    pub decode_errors: u64,
    pub consumer_errors: u64,
    pub provider_errors: u64,
}

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Latest decoded record
    pub records: watch::Receiver<Option<Arc<DecodedRecord>>>,
    /// Driver counters and state
    pub stats: watch::Receiver<DriverStats>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Driver pumps a provider through a channel
pub struct Driver;

impl Driver {
    /// Spawn the driver task for the given provider
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<P, C>(
        provider: P,
        channel: Arc<Channel>,
        consumer: C,
        config: &SubscriberConfig,
    ) -> DriverChannels
    where
        P: Provider,
        C: Consumer,
    {
        let (record_tx, record_rx) = watch::channel(None);
        let (stats_tx, stats_rx) = watch::channel(DriverStats::default());
        let cancel = CancellationToken::new();

        let span = info_span!("driver", topic = %config.topic);
        let task = DriverTask {
            channel,
            record_tx,
            stats_tx,
            cancel: cancel.clone(),
            max_errors: config.max_consecutive_errors.max(1),
        };
        tokio::spawn(task.run(provider, consumer).instrument(span));

        DriverChannels { records: record_rx, stats: stats_rx, cancel }
    }
}

struct DriverTask {
    channel: Arc<Channel>,
    record_tx: watch::Sender<Option<Arc<DecodedRecord>>>,
    stats_tx: watch::Sender<DriverStats>,
    cancel: CancellationToken,
    max_errors: u32,
}

impl DriverTask {
    async fn run<P, C>(self, mut provider: P, mut consumer: C)
    where
        P: Provider,
        C: Consumer,
    {
        info!("Driver task started");
        let mut error_count = 0u32;

        let final_state = loop {
            let result = tokio::select! {
                _ = self.cancel.cancelled() => break DriverState::Cancelled,
                result = provider.next_message() => result,
            };

            match result {
                Ok(Some(message)) => {
                    error_count = 0;
                    self.stats_tx.send_modify(|stats| stats.received += 1);
                    self.process(&message, &mut consumer);

                    if self.record_tx.is_closed() {
                        debug!("Record receivers dropped, shutting down");
                        break DriverState::Cancelled;
                    }
                }
                Ok(None) => {
                    info!("Provider stream ended");
                    break DriverState::Ended;
                }
                Err(e) => {
                    error_count += 1;
                    self.stats_tx.send_modify(|stats| stats.provider_errors += 1);
                    error!(attempt = error_count, max = self.max_errors, error = %e, "Provider error");

                    if error_count >= self.max_errors {
                        error!("Too many provider errors, shutting down");
                        break DriverState::Failed;
                    }

                    // Exponential backoff: 50ms, 100ms, 200ms, ... capped at 1.6s
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::select! {
                        _ = self.cancel.cancelled() => break DriverState::Cancelled,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        };

        self.stats_tx.send_modify(|stats| stats.state = final_state);
        let stats = self.stats_tx.borrow().clone();
        info!(
            state = ?final_state,
            received = stats.received,
            decoded = stats.decoded,
            decode_errors = stats.decode_errors,
            "Driver task ended"
        );
    }

    fn process<C: Consumer>(&self, message: &InboundMessage, consumer: &mut C) {
        let record = match self.channel.handle(message) {
            Ok(record) => record,
            Err(e) => {
                self.stats_tx.send_modify(|stats| stats.decode_errors += 1);
                warn!(
                    channel = %self.channel.name(),
                    bytes = message.payload.len(),
                    error = %e,
                    "Dropping message"
                );
                return;
            }
        };

        trace!(sequence = record.sequence, fields = record.len(), "Decoded message");

        let consumer_failed = match consumer.consume(&record) {
            Ok(()) => false,
            Err(e) => {
                warn!(sequence = record.sequence, error = %e, "Consumer failed");
                true
            }
        };

        self.stats_tx.send_modify(|stats| {
            stats.decoded += 1;
            if consumer_failed {
                stats.consumer_errors += 1;
            }
        });
        let _ = self.record_tx.send(Some(Arc::new(record)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ReplayProvider, queue};
    use crate::test_utils::battery_message;
    use crate::{MsgscopeError, Result};
    use std::sync::Mutex;

    async fn wait_for_state(
        stats: &mut watch::Receiver<DriverStats>,
        state: DriverState,
    ) -> DriverStats {
        let stats = stats.wait_for(|s| s.state == state).await.unwrap();
        stats.clone()
    }

    #[tokio::test]
    async fn consumer_sees_every_message_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let consumer = move |record: &DecodedRecord| -> anyhow::Result<()> {
            sink.lock().unwrap().push(record.u32("header.seq").unwrap_or_default());
            Ok(())
        };

        let provider = ReplayProvider::new((0..5).map(battery_message));
        let channel = Arc::new(Channel::new("battery", 8));
        let mut channels =
            Driver::spawn(provider, channel, consumer, &SubscriberConfig::default());

        let stats = wait_for_state(&mut channels.stats, DriverState::Ended).await;
        assert_eq!(stats.received, 5);
        assert_eq!(stats.decoded, 5);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);

        let latest = channels.records.borrow().clone().unwrap();
        assert_eq!(latest.sequence, 4);
    }

    #[tokio::test]
    async fn consumer_can_read_the_raw_payload() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&frames);
        let consumer = move |record: &DecodedRecord| -> anyhow::Result<()> {
            let header = crate::decode_header(&record.payload, 0)?;
            sink.lock().unwrap().push((header.seq, header.frame_id, record.payload.len()));
            Ok(())
        };

        let messages: Vec<_> = (3..5).map(battery_message).collect();
        let sizes: Vec<usize> = messages.iter().map(|m| m.payload.len()).collect();
        let mut channels = Driver::spawn(
            ReplayProvider::new(messages),
            Arc::new(Channel::default()),
            consumer,
            &SubscriberConfig::default(),
        );

        let stats = wait_for_state(&mut channels.stats, DriverState::Ended).await;
        assert_eq!(stats.consumer_errors, 0);
        assert_eq!(*frames.lock().unwrap(), vec![
            (3, "battery_link".to_string(), sizes[0]),
            (4, "battery_link".to_string(), sizes[1]),
        ]);
    }

    #[tokio::test]
    async fn bad_payload_is_skipped() {
        let good = battery_message(1);
        let messages = vec![good.clone(), good.with_payload(vec![0; 3]), battery_message(2)];
        let channel = Arc::new(Channel::new("battery", 8));

        let mut channels = Driver::spawn(
            ReplayProvider::new(messages),
            Arc::clone(&channel),
            Discard,
            &SubscriberConfig::default(),
        );

        let stats = wait_for_state(&mut channels.stats, DriverState::Ended).await;
        assert_eq!(stats.decoded, 2);
        assert_eq!(stats.decode_errors, 1);
        assert_eq!(channels.records.borrow().as_ref().unwrap().u32("header.seq"), Some(2));
    }

    #[tokio::test]
    async fn consumer_errors_do_not_stop_the_driver() {
        let consumer = |record: &DecodedRecord| -> anyhow::Result<()> {
            anyhow::ensure!(record.sequence % 2 == 0, "odd sequence {}", record.sequence);
            Ok(())
        };
        let mut channels = Driver::spawn(
            ReplayProvider::new((0..4).map(battery_message)),
            Arc::new(Channel::default()),
            consumer,
            &SubscriberConfig::default(),
        );

        let stats = wait_for_state(&mut channels.stats, DriverState::Ended).await;
        assert_eq!(stats.decoded, 4);
        assert_eq!(stats.consumer_errors, 2);
    }

    struct FailingProvider {
        calls: u32,
    }

    #[async_trait::async_trait]
    impl Provider for FailingProvider {
        async fn next_message(&mut self) -> Result<Option<InboundMessage>> {
            self.calls += 1;
            Err(MsgscopeError::provider_failed(format!("attempt {}", self.calls)))
        }
    }

    #[tokio::test]
    async fn gives_up_after_consecutive_provider_errors() {
        let config = SubscriberConfig { max_consecutive_errors: 2, ..Default::default() };
        let mut channels =
            Driver::spawn(FailingProvider { calls: 0 }, Arc::new(Channel::default()), Discard, &config);

        let stats = wait_for_state(&mut channels.stats, DriverState::Failed).await;
        assert_eq!(stats.provider_errors, 2);
        assert!(channels.records.borrow().is_none());
    }

    #[tokio::test]
    async fn cancellation_stops_an_idle_driver() {
        let (_sender, provider) = queue(4);
        let mut channels =
            Driver::spawn(provider, Arc::new(Channel::default()), Discard, &SubscriberConfig::default());

        channels.cancel.cancel();
        let stats = wait_for_state(&mut channels.stats, DriverState::Cancelled).await;
        assert_eq!(stats.received, 0);
    }
}
