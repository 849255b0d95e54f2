//! Runtime schema-driven decoding of ROS message payloads.
//!
//! msgscope turns a message definition that is only known at runtime (the
//! text a ROS publisher ships alongside its messages) into a flat, ordered
//! list of `(dotted path, value)` pairs for every payload, without generated
//! message types.
//!
//! # Features
//!
//! - **Definition parsing**: root fields plus `MSG:`-named nested types
//! - **Flattening**: composite fields expand depth-first into paths such as
//!   `header.stamp`
//! - **Bounds-checked decoding**: truncated payloads fail with an error naming
//!   the field, never a panic
//! - **Lazy channels**: a channel resolves its schema once, from the first
//!   message, and decodes concurrently afterwards
//! - **Streams**: async subscriptions with optional rate limiting
//!
//! Supported field types are `time`, `string`, `uint8`, `uint16`, `uint32` and
//! `uint64`. Fields of any other type are dropped from the flattened schema
//! and reported as unresolved.
//!
//! # Quick Start
//!
//! ```rust
//! use msgscope::{Channel, InboundMessage};
//!
//! let definition = "uint32 seq\nstring frame_id";
//! let payload = vec![7, 0, 0, 0, 4, 0, 0, 0, b'o', b'd', b'o', b'm'];
//!
//! let channel = Channel::new("/odom_meta", 32);
//! let record = channel.handle(&InboundMessage::untyped(definition, payload)).unwrap();
//!
//! assert_eq!(record.u32("seq"), Some(7));
//! assert_eq!(record.string("frame_id"), Some("odom"));
//! ```
//!
//! ## Example (async subscription)
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use msgscope::{InboundMessage, Msgscope, UpdateRate};
//!
//! #[tokio::main]
//! async fn main() -> msgscope::Result<()> {
//!     let (sender, provider) = Msgscope::queue(64);
//!     let subscription = Msgscope::subscribe(provider)?;
//!
//!     // Transport glue publishes every delivered message.
//!     sender.publish(InboundMessage::untyped("uint8 level", vec![3])).await?;
//!
//!     let mut records = subscription.records(UpdateRate::Max(10));
//!     while let Some(record) = records.next().await {
//!         for field in record.iter() {
//!             println!("{} = {}", field.path, field.value);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod text_utils;
pub mod types;

// Schema resolution and decoding
pub mod channel;
pub mod decoder;
pub mod schema;

// Stream-based subscription architecture
pub mod driver;
pub mod provider;
pub mod providers;
pub mod stream;
pub mod subscription;

// Ambient configuration
pub mod config;
pub mod logging;

// Core exports
pub use error::*;
pub use types::*;

pub use channel::{Channel, ChannelState};
pub use config::SubscriberConfig;
pub use decoder::{RecordDecoder, decode_header};
pub use driver::{Consumer, Discard, DriverState, DriverStats};
pub use provider::Provider;
pub use providers::{QueueProvider, QueueSender, ReplayProvider};
pub use schema::{ChannelSchema, MessageDefinition, TypeTable};
pub use subscription::Subscription;

/// Unified entry point for msgscope subscriptions.
///
/// # Examples
///
/// ```rust,no_run
/// use msgscope::{Msgscope, SubscriberConfig};
///
/// #[tokio::main]
/// async fn main() -> msgscope::Result<()> {
///     let config = SubscriberConfig::from_file("battery.yaml")?;
///     msgscope::logging::init_logging(&config.log);
///
///     let (sender, provider) = Msgscope::queue(64);
///     let print = |record: &msgscope::DecodedRecord| -> anyhow::Result<()> {
///         println!("{:?}", record.to_pairs());
///         Ok(())
///     };
///     let subscription = Msgscope::subscribe_with(provider, config, print)?;
///     # drop((sender, subscription));
///     Ok(())
/// }
/// ```
pub struct Msgscope;

impl Msgscope {
    /// Subscribe to a provider with the default configuration.
    pub fn subscribe<P: Provider>(provider: P) -> Result<Subscription> {
        Subscription::open(provider, SubscriberConfig::default())
    }

    /// Subscribe with a configuration and a per-message consumer.
    pub fn subscribe_with<P, C>(
        provider: P,
        config: SubscriberConfig,
        consumer: C,
    ) -> Result<Subscription>
    where
        P: Provider,
        C: Consumer,
    {
        Subscription::with_consumer(provider, config, consumer)
    }

    /// Create a bounded queue that transport glue can publish into.
    pub fn queue(capacity: usize) -> (QueueSender, QueueProvider) {
        providers::queue(capacity)
    }
}
