use std::time::Duration;

use fake::{Fake, Faker};
use interop_shims::{
    driver,
    error::ShimError,
    types::{ReceiveReport, ReceiveRequest, SendRequest},
    LoopbackBroker, MessageShape,
};

pub const RECEIVE_TIMEOUT: Duration = Duration::from_millis(200);

/// A loopback broker and a queue nobody else uses
pub struct TestBroker {
    pub broker: LoopbackBroker,
    pub queue: String,
}

impl TestBroker {
    pub fn create() -> TestBroker {
        let suffix: String = Faker.fake();
        TestBroker {
            broker: LoopbackBroker::new(),
            queue: format!("interop.{}", suffix),
        }
    }

    pub async fn send(&self, shape: MessageShape, json: &str) -> Result<usize, ShimError> {
        let request = SendRequest::parse(json)?;
        driver::run_sender(&self.broker, &self.queue, shape, &request).await
    }

    pub async fn receive(&self, shape: MessageShape, json: &str) -> Result<ReceiveReport, ShimError> {
        let request = ReceiveRequest::parse(json)?;
        driver::run_receiver(&self.broker, &self.queue, shape, &request, RECEIVE_TIMEOUT).await
    }

    /// Sends `send_json` and receives it back with `receive_json`.
    pub async fn round_trip(
        &self,
        shape: MessageShape,
        send_json: &str,
        receive_json: &str,
    ) -> ReceiveReport {
        self.send(shape, send_json).await.unwrap();
        self.receive(shape, receive_json).await.unwrap()
    }

    pub async fn pending(&self) -> usize {
        self.broker.pending(&self.queue).await
    }
}
