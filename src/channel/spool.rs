//! File backed broker: every queue is an append-only log of framed AMQP
//! messages with a sidecar file holding the consumer offset, so a sender
//! and a receiver running as separate processes can meet on one host.
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use bytes::BytesMut;
use futures::SinkExt;
use interop_shims_protocol::{jms::JmsDestinationType, message::Message};
use tokio::{
    fs::{self, OpenOptions},
    time::{sleep, Instant},
};
use tokio_util::codec::{Decoder, FramedWrite};
use tracing::{debug, trace};
use url::Url;

use super::{codec::FrameCodec, temporary_name, Channel, Connector, Destination};
use crate::{error::ShimError, options::ShimOptions, ShimResult};

const LOG_EXTENSION: &str = "log";
const OFFSET_EXTENSION: &str = "offset";

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn broker_url(address: &str) -> ShimResult<Url> {
    let with_scheme = if address.contains("://") {
        address.to_owned()
    } else {
        format!("amqp://{}", address)
    };
    Url::parse(&with_scheme)
        .map_err(|err| ShimError::Argument(format!("broker address \"{}\": {}", address, err)))
}

/// Directory name for a broker address such as `amqp://host:5672` or
/// plain `host:5672`.
fn broker_directory(address: &str) -> ShimResult<String> {
    let url = broker_url(address)?;
    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| ShimError::Argument(format!("broker address \"{}\" has no host", address)))?;

    Ok(match url.port() {
        Some(port) => file_safe(&format!("{}_{}", host, port)),
        None => file_safe(host),
    })
}

/// Connects to the spool directory of one broker address
#[derive(Clone, Debug)]
pub struct SpoolBroker {
    directory: PathBuf,
    poll_interval: Duration,
    user: String,
}

impl SpoolBroker {
    /// User info in the address wins over the configured user.
    pub fn new(address: &str, options: &ShimOptions) -> ShimResult<SpoolBroker> {
        let url = broker_url(address)?;
        let user = match url.username() {
            "" => options.get_user().to_owned(),
            user => user.to_owned(),
        };
        Ok(SpoolBroker {
            directory: options.get_spool_root().join(broker_directory(address)?),
            poll_interval: options.get_poll_interval(),
            user,
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl Connector for SpoolBroker {
    type Channel = SpoolChannel;

    async fn connect(&self, queue: &str) -> ShimResult<SpoolChannel> {
        fs::create_dir_all(&self.directory).await.map_err(|err| {
            ShimError::Connection(format!(
                "cannot open spool {}: {}",
                self.directory.display(),
                err
            ))
        })?;
        debug!(
            "Spool channel opened on {} in {} as {}",
            queue,
            self.directory.display(),
            self.user
        );

        Ok(SpoolChannel {
            log: self.directory.join(format!("{}.{}", file_safe(queue), LOG_EXTENSION)),
            offset: self
                .directory
                .join(format!("{}.{}", file_safe(queue), OFFSET_EXTENSION)),
            queue: queue.to_owned(),
            poll_interval: self.poll_interval,
            closed: false,
        })
    }
}

pub struct SpoolChannel {
    log: PathBuf,
    offset: PathBuf,
    queue: String,
    poll_interval: Duration,
    closed: bool,
}

impl SpoolChannel {
    fn check_open(&self) -> ShimResult<()> {
        if self.closed {
            Err(ShimError::Connection(format!("channel on {} is closed", self.queue)))
        } else {
            Ok(())
        }
    }

    async fn read_offset(&self) -> ShimResult<u64> {
        match fs::read_to_string(&self.offset).await {
            Ok(text) => text.trim().parse().map_err(|err| {
                ShimError::Connection(format!(
                    "corrupt offset file {}: {}",
                    self.offset.display(),
                    err
                ))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(err) => Err(err.into()),
        }
    }

    /// Decodes the frame at the stored offset and moves the offset past it.
    async fn take_next(&self) -> ShimResult<Option<Message>> {
        let log = match fs::read(&self.log).await {
            Ok(log) => log,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let offset = self.read_offset().await?;
        if offset as usize >= log.len() {
            return Ok(None);
        }

        let mut pending = BytesMut::from(&log[offset as usize..]);
        let available = pending.len();
        match FrameCodec::default().decode(&mut pending)? {
            Some(message) => {
                let consumed = (available - pending.len()) as u64;
                fs::write(&self.offset, (offset + consumed).to_string()).await?;
                trace!("Spool read {} bytes at offset {} of {}", consumed, offset, self.queue);
                Ok(Some(message))
            }
            // the writer has not finished the frame yet
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Channel for SpoolChannel {
    fn queue(&self) -> &str {
        &self.queue
    }

    async fn create_destination(
        &mut self,
        kind: JmsDestinationType,
        name: &str,
    ) -> ShimResult<Destination> {
        self.check_open()?;
        if kind.is_temporary() {
            Ok(Destination::new(kind, temporary_name(kind)))
        } else {
            Ok(Destination::new(kind, name))
        }
    }

    async fn send(&mut self, message: Message) -> ShimResult<()> {
        self.check_open()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log)
            .await?;

        let mut framed = FramedWrite::new(file, FrameCodec::default());
        framed.send(message).await?;
        framed.into_inner().sync_data().await?;
        Ok(())
    }

    async fn receive(&mut self, timeout: Duration) -> ShimResult<Option<Message>> {
        self.check_open()?;
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(message) = self.take_next().await? {
                return Ok(Some(message));
            }
            let now = Instant::now();
            if now >= deadline {
                debug!("Spool receive on {} timed out", self.queue);
                return Ok(None);
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    async fn close(&mut self) -> ShimResult<()> {
        self.closed = true;
        Ok(())
    }
}
