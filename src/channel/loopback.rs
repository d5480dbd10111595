use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use bytes::BytesMut;
use interop_shims_protocol::{jms::JmsDestinationType, message::Message};
use tokio::{
    sync::{Mutex, Notify},
    time::{timeout_at, Instant},
};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use super::{codec::FrameCodec, temporary_name, Channel, Connector, Destination};
use crate::{error::ShimError, ShimResult};

#[derive(Default)]
struct BrokerState {
    queues: HashMap<String, VecDeque<BytesMut>>,
    destinations: Vec<Destination>,
    disconnected: bool,
    closed_channels: usize,
}

/// In-process broker holding encoded frames per queue
#[derive(Clone, Default)]
pub struct LoopbackBroker {
    state: Arc<Mutex<BrokerState>>,
    arrivals: Arc<Notify>,
}

impl LoopbackBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every channel as a broker-initiated disconnect would.
    pub async fn disconnect(&self) {
        self.state.lock().await.disconnected = true;
        self.arrivals.notify_waiters();
    }

    /// Frames waiting on `queue`
    pub async fn pending(&self, queue: &str) -> usize {
        self.state
            .lock()
            .await
            .queues
            .get(queue)
            .map_or(0, VecDeque::len)
    }

    pub async fn closed_channels(&self) -> usize {
        self.state.lock().await.closed_channels
    }

    /// Destinations created through any channel
    pub async fn destinations(&self) -> Vec<Destination> {
        self.state.lock().await.destinations.clone()
    }
}

#[async_trait]
impl Connector for LoopbackBroker {
    type Channel = LoopbackChannel;

    async fn connect(&self, queue: &str) -> ShimResult<LoopbackChannel> {
        let mut state = self.state.lock().await;
        if state.disconnected {
            return Err(ShimError::Connection("loopback broker is down".to_owned()));
        }
        state.queues.entry(queue.to_owned()).or_default();
        debug!("Loopback channel opened on {}", queue);

        Ok(LoopbackChannel {
            broker: self.clone(),
            queue: queue.to_owned(),
            closed: false,
        })
    }
}

pub struct LoopbackChannel {
    broker: LoopbackBroker,
    queue: String,
    closed: bool,
}

impl LoopbackChannel {
    fn check_open(&self, state: &BrokerState) -> ShimResult<()> {
        if self.closed {
            Err(ShimError::Connection(format!("channel on {} is closed", self.queue)))
        } else if state.disconnected {
            Err(ShimError::Connection(format!(
                "broker disconnected channel on {}",
                self.queue
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Channel for LoopbackChannel {
    fn queue(&self) -> &str {
        &self.queue
    }

    async fn create_destination(
        &mut self,
        kind: JmsDestinationType,
        name: &str,
    ) -> ShimResult<Destination> {
        let mut state = self.broker.state.lock().await;
        self.check_open(&state)?;

        let name = if kind.is_temporary() {
            temporary_name(kind)
        } else {
            name.to_owned()
        };
        let destination = Destination::new(kind, name);
        state.queues.entry(destination.name().to_owned()).or_default();
        state.destinations.push(destination.clone());
        Ok(destination)
    }

    async fn send(&mut self, message: Message) -> ShimResult<()> {
        let mut frame = BytesMut::new();
        FrameCodec::default().encode(message, &mut frame)?;

        let mut state = self.broker.state.lock().await;
        self.check_open(&state)?;
        trace!("Loopback frame of {} bytes to {}", frame.len(), self.queue);
        state
            .queues
            .entry(self.queue.clone())
            .or_default()
            .push_back(frame);
        drop(state);

        self.broker.arrivals.notify_waiters();
        Ok(())
    }

    async fn receive(&mut self, timeout: Duration) -> ShimResult<Option<Message>> {
        let deadline = Instant::now() + timeout;
        loop {
            // registered before the queue check so a send in between is not missed
            let arrival = self.broker.arrivals.notified();
            {
                let mut state = self.broker.state.lock().await;
                self.check_open(&state)?;
                let frame = state
                    .queues
                    .get_mut(&self.queue)
                    .and_then(VecDeque::pop_front);
                if let Some(mut frame) = frame {
                    return match FrameCodec::default().decode(&mut frame)? {
                        Some(message) => Ok(Some(message)),
                        None => Err(ShimError::Connection(format!(
                            "truncated frame on {}",
                            self.queue
                        ))),
                    };
                }
            }

            if timeout_at(deadline, arrival).await.is_err() {
                debug!("Loopback receive on {} timed out", self.queue);
                return Ok(None);
            }
        }
    }

    async fn close(&mut self) -> ShimResult<()> {
        if !self.closed {
            self.closed = true;
            self.broker.state.lock().await.closed_channels += 1;
            debug!("Loopback channel on {} closed", self.queue);
        }
        Ok(())
    }
}
