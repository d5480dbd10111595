//! The already-open link to a broker queue the shims send to and receive
//! from, plus the transports that provide it.
use std::{fmt, time::Duration};

use async_trait::async_trait;
use interop_shims_protocol::{jms::JmsDestinationType, message::Message};

use crate::ShimResult;

mod codec;
mod loopback;
mod spool;

pub use self::loopback::{LoopbackBroker, LoopbackChannel};
pub use self::spool::{SpoolBroker, SpoolChannel};

/// A queue or topic, possibly temporary, messages can be addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    kind: JmsDestinationType,
    name: String,
}

impl Destination {
    pub fn new(kind: JmsDestinationType, name: impl Into<String>) -> Self {
        Destination {
            kind,
            name: name.into(),
        }
    }

    pub fn queue(name: impl Into<String>) -> Self {
        Destination::new(JmsDestinationType::Queue, name)
    }

    pub fn kind(&self) -> JmsDestinationType {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Name a broker gives a new temporary destination
pub(crate) fn temporary_name(kind: JmsDestinationType) -> String {
    let prefix = if kind.is_topic() {
        "temp-topic"
    } else {
        "temp-queue"
    };
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

/// Session bound to one queue
#[async_trait]
pub trait Channel: Send {
    /// The queue this channel produces to and consumes from
    fn queue(&self) -> &str;

    /// Resolves a named destination, or creates a fresh one when `kind` is
    /// temporary (`name` is ignored then).
    async fn create_destination(
        &mut self,
        kind: JmsDestinationType,
        name: &str,
    ) -> ShimResult<Destination>;

    async fn send(&mut self, message: Message) -> ShimResult<()>;

    /// Next message of the queue, `None` once `timeout` elapses.
    async fn receive(&mut self, timeout: Duration) -> ShimResult<Option<Message>>;

    async fn close(&mut self) -> ShimResult<()>;
}

/// Opens channels against a broker
#[async_trait]
pub trait Connector: Send + Sync {
    type Channel: Channel;

    async fn connect(&self, queue: &str) -> ShimResult<Self::Channel>;
}

#[cfg(test)]
mod tests {
    use interop_shims_protocol::jms::JmsDestinationType;
    use pretty_assertions::assert_eq;

    use super::{temporary_name, Destination};

    #[test]
    fn temporary_names_are_unique_and_tagged() {
        let topic = temporary_name(JmsDestinationType::TemporaryTopic);
        let queue = temporary_name(JmsDestinationType::TemporaryQueue);
        assert!(topic.starts_with("temp-topic-"));
        assert!(queue.starts_with("temp-queue-"));
        assert!(queue != temporary_name(JmsDestinationType::TemporaryQueue));
    }

    #[test]
    fn destination_accessors() {
        let destination = Destination::queue("jms.queue.test");
        assert_eq!(JmsDestinationType::Queue, destination.kind());
        assert_eq!("jms.queue.test", destination.to_string());
    }
}
