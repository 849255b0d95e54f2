//! Subscription handle tying a provider, a channel and a consumer together

use futures::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::channel::{Channel, ChannelState};
use crate::config::SubscriberConfig;
use crate::driver::{Consumer, Discard, Driver, DriverState, DriverStats};
use crate::provider::Provider;
use crate::schema::ChannelSchema;
use crate::stream::ThrottleExt;
use crate::types::{DecodedRecord, UpdateRate};
use crate::{MsgscopeError, Result};

/// Live subscription to one channel
///
/// Owns the driver task; dropping the subscription stops it.
pub struct Subscription {
    channel: Arc<Channel>,
    records: watch::Receiver<Option<Arc<DecodedRecord>>>,
    stats: watch::Receiver<DriverStats>,
    source_hz: Option<f64>,
    config: SubscriberConfig,
    cancel: CancellationToken,
}

impl Subscription {
    /// Subscribe without a consumer callback; use [`records`](Self::records)
    /// or [`latest`](Self::latest) to read decoded data.
    pub fn open<P: Provider>(provider: P, config: SubscriberConfig) -> Result<Self> {
        Self::with_consumer(provider, config, Discard)
    }

    /// Subscribe with a consumer invoked once per decoded message.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_consumer<P, C>(provider: P, config: SubscriberConfig, consumer: C) -> Result<Self>
    where
        P: Provider,
        C: Consumer,
    {
        config.validate()?;

        let source_hz = provider.source_rate();
        let channel = Arc::new(Channel::from_config(&config));
        let channels = Driver::spawn(provider, Arc::clone(&channel), consumer, &config);

        info!(topic = %config.topic, source_hz = ?source_hz, "Subscription opened");

        Ok(Self {
            channel,
            records: channels.records,
            stats: channels.stats,
            source_hz,
            config,
            cancel: channels.cancel,
        })
    }

    /// Decoded records as a stream
    ///
    /// Streams see the latest record at the time they are polled; with
    /// `UpdateRate::Max` intermediate records are skipped. The stream ends
    /// when the driver stops.
    pub fn records(&self, rate: UpdateRate) -> impl Stream<Item = Arc<DecodedRecord>> + 'static {
        let records = WatchStream::new(self.records.clone()).filter_map(|opt| async move { opt });

        match rate.throttle_interval(self.source_hz) {
            None => records.boxed(),
            Some(period) => records.throttle(period).boxed(),
        }
    }

    /// Most recently decoded record
    pub fn latest(&self) -> Option<Arc<DecodedRecord>> {
        self.records.borrow().clone()
    }

    /// The channel's schema, once the first message has been handled
    pub fn schema(&self) -> Option<Arc<ChannelSchema>> {
        self.channel.schema()
    }

    pub fn state(&self) -> ChannelState {
        self.channel.state()
    }

    /// Snapshot of the driver's counters
    pub fn stats(&self) -> DriverStats {
        self.stats.borrow().clone()
    }

    pub fn topic(&self) -> &str {
        &self.config.topic
    }

    pub fn source_hz(&self) -> Option<f64> {
        self.source_hz
    }

    /// Wait until the channel has resolved its schema.
    ///
    /// Fails with [`MsgscopeError::Timeout`] after `timeout`, or with
    /// [`MsgscopeError::ChannelClosed`] if the driver stops first.
    pub async fn wait_initialized(&self, timeout: Duration) -> Result<Arc<ChannelSchema>> {
        let mut stats = self.stats.clone();

        let waited = tokio::time::timeout(timeout, async {
            loop {
                if let Some(schema) = self.channel.schema() {
                    return Ok(schema);
                }
                let state = stats.borrow_and_update().state;
                if state != DriverState::Running {
                    return Err(MsgscopeError::channel_closed(format!(
                        "driver stopped ({state:?}) before the channel was initialized"
                    )));
                }
                if stats.changed().await.is_err() {
                    return self.channel.schema().ok_or_else(|| {
                        MsgscopeError::channel_closed("driver task exited before initialization")
                    });
                }
            }
        })
        .await;

        waited.unwrap_or(Err(MsgscopeError::Timeout { duration: timeout }))
    }

    /// [`wait_initialized`](Self::wait_initialized) with the configured timeout
    pub async fn ready(&self) -> Result<Arc<ChannelSchema>> {
        self.wait_initialized(self.config.init_timeout()).await
    }

    /// Wait for the driver to stop on its own and return its final counters.
    pub async fn finished(&self) -> DriverStats {
        let mut stats = self.stats.clone();
        let _ = stats.wait_for(|s| s.state != DriverState::Running).await;
        stats.borrow().clone()
    }

    /// Stop the driver and wait for it to finish.
    pub async fn shutdown(self) -> DriverStats {
        self.cancel.cancel();
        self.finished().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!(topic = %self.config.topic, "Dropping subscription");
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ReplayProvider, queue};
    use crate::test_utils::{BATTERY_DEFINITION, battery_message};
    use crate::types::InboundMessage;

    #[tokio::test]
    async fn records_stream_yields_decoded_records() {
        let (sender, provider) = queue(8);
        let subscription = Subscription::open(provider, SubscriberConfig::for_topic("/battery"))
            .unwrap();
        let mut records = subscription.records(UpdateRate::Native);

        sender.publish(battery_message(7)).await.unwrap();
        let record = records.next().await.unwrap();
        assert_eq!(record.u32("header.seq"), Some(7));
        assert_eq!(subscription.state(), ChannelState::Initialized);
        assert_eq!(subscription.latest().unwrap().sequence, 0);
    }

    #[tokio::test]
    async fn wait_initialized_returns_the_schema() {
        let (sender, provider) = queue(8);
        let subscription = Subscription::open(provider, SubscriberConfig::default()).unwrap();
        assert!(subscription.schema().is_none());

        sender.publish(battery_message(1)).await.unwrap();
        let schema = subscription.wait_initialized(Duration::from_secs(5)).await.unwrap();
        assert_eq!(&*schema.source, BATTERY_DEFINITION);
        assert_eq!(schema.flattened().len(), 10);
    }

    #[tokio::test]
    async fn wait_initialized_times_out_without_messages() {
        let (_sender, provider) = queue(8);
        let subscription = Subscription::open(provider, SubscriberConfig::default()).unwrap();

        let err = subscription.wait_initialized(Duration::from_millis(20)).await.unwrap_err();
        assert!(matches!(err, MsgscopeError::Timeout { .. }));
    }

    #[tokio::test]
    async fn wait_initialized_fails_when_source_ends_first() {
        let subscription =
            Subscription::open(ReplayProvider::new([]), SubscriberConfig::default()).unwrap();
        let err = subscription.wait_initialized(Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, MsgscopeError::ChannelClosed { .. }));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let config = SubscriberConfig { max_nesting_depth: 0, ..Default::default() };
        let result = Subscription::open(ReplayProvider::new([]), config);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn shutdown_stops_the_driver() {
        let (sender, provider) = queue(8);
        let subscription = Subscription::open(provider, SubscriberConfig::default()).unwrap();
        sender.publish(InboundMessage::untyped("uint8 v", vec![3])).await.unwrap();
        subscription.ready().await.unwrap();

        let stats = subscription.shutdown().await;
        assert_eq!(stats.state, DriverState::Cancelled);
        assert_eq!(stats.received, 1);

        // The driver owned the provider; once it is gone the queue is closed.
        tokio::time::timeout(Duration::from_secs(5), async {
            while !sender.is_closed() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn dropping_the_subscription_closes_the_queue() {
        let (sender, provider) = queue(8);
        let subscription = Subscription::open(provider, SubscriberConfig::default()).unwrap();
        drop(subscription);

        tokio::time::timeout(Duration::from_secs(5), async {
            while !sender.is_closed() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
    }
}
