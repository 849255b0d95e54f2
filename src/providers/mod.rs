//! Built-in message providers
//!
//! - [`QueueProvider`]: messages pushed by transport glue through a [`QueueSender`]
//! - [`ReplayProvider`]: a recorded message list, optionally paced at a fixed rate

pub mod queue;
pub mod replay;

pub use queue::{QueueProvider, QueueSender, queue};
pub use replay::ReplayProvider;
