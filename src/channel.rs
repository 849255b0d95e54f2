//! Per-channel decoding session
//!
//! A [`Channel`] resolves its schema exactly once, from the definition text
//! carried by the first message it sees, and decodes every payload (the
//! first included) against that cached schema. Later definitions are never
//! re-parsed, even when they differ.
//!
//! Initialization is serialized by a mutex; once the schema is published
//! through a [`OnceLock`] all reads are lock-free, so any number of threads
//! may decode concurrently.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::{debug, info, warn};

use crate::config::SubscriberConfig;
use crate::decoder::RecordDecoder;
use crate::schema::{ChannelSchema, DEFAULT_MAX_NESTING_DEPTH};
use crate::types::{DecodedRecord, InboundMessage};
use crate::{MsgscopeError, Result};

/// Initialization state of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelState {
    /// No schema yet; the next message triggers initialization
    Uninitialized,
    /// A thread is currently parsing and flattening a definition
    Initializing,
    /// Schema cached; never changes again
    Initialized,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelState::Uninitialized => "uninitialized",
            ChannelState::Initializing => "initializing",
            ChannelState::Initialized => "initialized",
        };
        f.write_str(name)
    }
}

/// One logical message channel with a lazily resolved schema.
pub struct Channel {
    name: String,
    max_depth: usize,
    init_lock: Mutex<()>,
    schema: OnceLock<Arc<ChannelSchema>>,
    initializing: AtomicBool,
    decoded: AtomicU64,
    mismatch_reported: AtomicBool,
}

impl Channel {
    /// Create an uninitialized channel.
    pub fn new(name: impl Into<String>, max_depth: usize) -> Self {
        Self {
            name: name.into(),
            max_depth,
            init_lock: Mutex::new(()),
            schema: OnceLock::new(),
            initializing: AtomicBool::new(false),
            decoded: AtomicU64::new(0),
            mismatch_reported: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &SubscriberConfig) -> Self {
        Self::new(config.topic.clone(), config.max_nesting_depth)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ChannelState {
        if self.schema.get().is_some() {
            ChannelState::Initialized
        } else if self.initializing.load(Ordering::Acquire) {
            ChannelState::Initializing
        } else {
            ChannelState::Uninitialized
        }
    }

    /// The cached schema, once initialized.
    pub fn schema(&self) -> Option<Arc<ChannelSchema>> {
        self.schema.get().cloned()
    }

    /// Number of decode attempts so far; also the next record's sequence number.
    pub fn decoded_count(&self) -> u64 {
        self.decoded.load(Ordering::Relaxed)
    }

    /// Initialize from definition text.
    ///
    /// Returns the already cached schema if the channel is initialized; the
    /// text is not parsed in that case.
    pub fn initialize(&self, definition: &str) -> Result<Arc<ChannelSchema>> {
        self.initialize_with(|| ChannelSchema::build(definition, self.max_depth))
    }

    /// Handle one inbound message: initialize on first use, then decode.
    ///
    /// A failed initialization leaves the channel uninitialized so the next
    /// message retries with its own definition. Decode failures only affect
    /// this message.
    pub fn handle(&self, message: &InboundMessage) -> Result<DecodedRecord> {
        let schema = match self.schema.get() {
            Some(schema) => Arc::clone(schema),
            None => self
                .initialize_with(|| ChannelSchema::from_message(message, self.max_depth))?,
        };

        if schema.differs_from(message) && !self.mismatch_reported.swap(true, Ordering::Relaxed) {
            warn!(
                channel = %self.name,
                cached_md5 = %schema.md5sum,
                message_md5 = %message.md5sum,
                "Message definition differs from the cached schema; decoding with the cached schema"
            );
        }

        self.decode_with(&schema, Arc::clone(&message.payload))
    }

    /// Decode a payload against the cached schema.
    ///
    /// Fails with [`MsgscopeError::NotInitialized`] before the first
    /// successful initialization.
    pub fn decode(&self, payload: &[u8]) -> Result<DecodedRecord> {
        let schema = self
            .schema
            .get()
            .ok_or_else(|| MsgscopeError::NotInitialized { channel: self.name.clone() })?;
        self.decode_with(schema, Arc::from(payload))
    }

    fn decode_with(&self, schema: &ChannelSchema, payload: Arc<[u8]>) -> Result<DecodedRecord> {
        let sequence = self.decoded.fetch_add(1, Ordering::Relaxed);
        let mut record = RecordDecoder::new(schema.flattened()).decode(&payload)?;
        record.sequence = sequence;
        record.payload = payload;
        Ok(record)
    }

    fn initialize_with<F>(&self, build: F) -> Result<Arc<ChannelSchema>>
    where
        F: FnOnce() -> Result<ChannelSchema>,
    {
        if let Some(schema) = self.schema.get() {
            return Ok(Arc::clone(schema));
        }

        // Nothing guarded by the lock can be left half-written, so a poisoned
        // lock is still usable.
        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(schema) = self.schema.get() {
            debug!(channel = %self.name, "Channel initialized by a concurrent message");
            return Ok(Arc::clone(schema));
        }

        self.initializing.store(true, Ordering::Release);
        let built = build();

        let schema = match built {
            Ok(schema) => Arc::new(schema),
            Err(e) => {
                self.initializing.store(false, Ordering::Release);
                warn!(channel = %self.name, error = %e, "Channel initialization failed");
                return Err(e);
            }
        };

        let schema = Arc::clone(self.schema.get_or_init(|| schema));
        self.initializing.store(false, Ordering::Release);

        info!(
            channel = %self.name,
            datatype = %schema.datatype,
            fields = schema.flattened().len(),
            unresolved = schema.flattened().unresolved.len(),
            "Channel initialized"
        );
        Ok(schema)
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new("unnamed", DEFAULT_MAX_NESTING_DEPTH)
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("max_depth", &self.max_depth)
            .field("decoded", &self.decoded_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{BATTERY_DEFINITION, PayloadBuilder, battery_message};

    #[test]
    fn starts_uninitialized_and_refuses_to_decode() {
        let channel = Channel::new("battery", 8);
        assert_eq!(channel.state(), ChannelState::Uninitialized);
        assert!(channel.schema().is_none());

        let err = channel.decode(&[1, 2, 3]).unwrap_err();
        match err {
            MsgscopeError::NotInitialized { channel } => assert_eq!(channel, "battery"),
            other => panic!("Expected NotInitialized, got {other:?}"),
        }
    }

    #[test]
    fn first_message_initializes_and_is_decoded() {
        let channel = Channel::new("battery", 8);
        let record = channel.handle(&battery_message(1)).unwrap();

        assert_eq!(channel.state(), ChannelState::Initialized);
        assert_eq!(record.u32("header.seq"), Some(1));
        assert_eq!(record.u8("health.level"), Some(1));
        assert_eq!(record.sequence, 0);
    }

    #[test]
    fn later_definitions_are_ignored() {
        let channel = Channel::new("mixed", 8);
        let first = InboundMessage::untyped("uint8 a", vec![5]);
        let second = InboundMessage::untyped("uint16 b", vec![1, 2]);

        let r1 = channel.handle(&first).unwrap();
        let cached = channel.schema().unwrap();
        let r2 = channel.handle(&second).unwrap();

        assert_eq!(r1.u8("a"), Some(5));
        assert_eq!(r2.u8("a"), Some(1));
        assert!(r2.get("b").is_none());
        assert!(Arc::ptr_eq(&cached, &channel.schema().unwrap()));
    }

    #[test]
    fn explicit_initialize_is_idempotent() {
        let channel = Channel::default();
        let a = channel.initialize("uint32 seq").unwrap();
        let b = channel.initialize("string other").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.flattened().paths(), ["seq"]);
    }

    #[test]
    fn decode_error_does_not_poison_the_channel() {
        let channel = Channel::new("battery", 8);
        let good = battery_message(2);
        channel.handle(&good).unwrap();

        let truncated = good.with_payload(good.payload[..10].to_vec());
        let err = channel.handle(&truncated).unwrap_err();
        assert!(matches!(err, MsgscopeError::OutOfBounds { .. }));

        let record = channel.handle(&battery_message(3)).unwrap();
        assert_eq!(record.u32("header.seq"), Some(3));
        assert_eq!(channel.state(), ChannelState::Initialized);
    }

    #[test]
    fn failed_initialization_is_retried() {
        let channel = Channel::new("cyclic", 8);
        let cyclic = InboundMessage::untyped("Node n\n===\nMSG: p/Node\nNode next", vec![]);

        let err = channel.handle(&cyclic).unwrap_err();
        assert!(matches!(err, MsgscopeError::Recursion { .. }));
        assert_eq!(channel.state(), ChannelState::Uninitialized);

        let record = channel.handle(&InboundMessage::untyped("uint8 v", vec![9])).unwrap();
        assert_eq!(record.u8("v"), Some(9));
        assert_eq!(channel.state(), ChannelState::Initialized);
    }

    #[test]
    fn sequence_counts_decode_attempts() {
        let channel = Channel::default();
        let message = InboundMessage::untyped("uint8 v", vec![1]);

        assert_eq!(channel.handle(&message).unwrap().sequence, 0);
        assert!(channel.handle(&message.with_payload(vec![])).is_err());
        assert_eq!(channel.handle(&message).unwrap().sequence, 2);
        assert_eq!(channel.decoded_count(), 3);
    }

    #[test]
    fn concurrent_first_messages_share_one_schema() {
        let channel = Channel::new("battery", 8);

        let schemas: Vec<Arc<ChannelSchema>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|seq| {
                    let channel = &channel;
                    scope.spawn(move || {
                        let record = channel.handle(&battery_message(seq)).unwrap();
                        assert_eq!(record.u32("header.seq"), Some(seq));
                        channel.schema().unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(schemas.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        assert_eq!(channel.decoded_count(), 8);
    }

    #[test]
    fn decode_uses_cached_schema_directly() {
        let channel = Channel::default();
        channel.initialize(BATTERY_DEFINITION).unwrap();

        let payload = PayloadBuilder::new().u32(4).time(1, 2).string("x").build();
        // Payload stops after the header, so the first battery field is missing.
        let err = channel.decode(&payload).unwrap_err();
        match err {
            MsgscopeError::OutOfBounds { field, .. } => assert_eq!(field, "status"),
            other => panic!("Expected OutOfBounds, got {other:?}"),
        }
    }

    #[test]
    fn records_keep_the_raw_payload() {
        let channel = Channel::default();
        let message = battery_message(9);
        let record = channel.handle(&message).unwrap();
        assert!(Arc::ptr_eq(&record.payload, &message.payload));

        let copied = channel.decode(&message.payload).unwrap();
        assert_eq!(&*copied.payload, &*message.payload);
    }
}
