//! The message bus boundary: a keyed, partitioned, asynchronous pub/sub
//! interface the Publisher hands reports to. External collaborator —
//! interface only; the concrete Kafka client lives in [`kafka`].

mod kafka;
mod mock;
mod null;

use std::time::Duration;

pub use kafka::KafkaBus;
pub use mock::{MockBus, Recorder};
pub use null::NullBus;

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("producer queue is full")]
    QueueFull,
    #[error("bus error: {0}")]
    Other(String),
}

/// A partitioned, keyed, asynchronous message bus.
///
/// `produce` must not block the caller beyond the underlying client's
/// in-memory queue; a full queue is a transient `BusError::QueueFull`,
/// never a block. `poll` drives delivery acknowledgement callbacks and
/// must be non-blocking at `Duration::ZERO`. `flush` blocks until every
/// buffered message is acknowledged or `timeout` elapses.
pub trait MessageBus: Send {
    fn produce(&self, topic: &str, key: &[u8], value: &[u8]) -> Result<(), BusError>;
    fn poll(&self, timeout: Duration);
    fn flush(&self, timeout: Duration);
}
