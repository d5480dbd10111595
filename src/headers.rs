//! JMS header fields and their AMQP home: `JMS_TYPE_HEADER` is the
//! subject, `JMS_CORRELATIONID_HEADER` the correlation id and
//! `JMS_REPLYTO_HEADER` the reply-to address plus its destination kind
//! annotation.
use std::{fmt, str::FromStr};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use interop_shims_protocol::{
    jms::{JmsDestinationType, JMS_DEST, JMS_REPLY_TO},
    message::{Message, MessageBuilder, MessageId, Timestamp},
};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::{
    channel::{Channel, Destination},
    error::ShimError,
    ShimResult,
};

pub const TYPE_HEADER: &str = "JMS_TYPE_HEADER";
pub const CORRELATION_ID_HEADER: &str = "JMS_CORRELATIONID_HEADER";
pub const REPLY_TO_HEADER: &str = "JMS_REPLYTO_HEADER";

pub const CORRELATION_ID_AS_BYTES_FLAG: &str = "JMS_CORRELATIONID_AS_BYTES";
pub const REPLY_TO_AS_TOPIC_FLAG: &str = "JMS_REPLYTO_AS_TOPIC";
pub const CLIENT_CHECKS_FLAG: &str = "JMS_CLIENT_CHECKS";

/// JMS priority a compliant producer uses when none is given
pub const DEFAULT_PRIORITY: u8 = 4;
/// Oldest creation time the strict checks accept, in milliseconds
pub const MAX_TIMESTAMP_SKEW_MS: i64 = 60 * 1000;

const BINARY_ID_PREFIX: &str = "ID:AMQP_BINARY:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeaderName {
    Type,
    CorrelationId,
    ReplyTo,
}

impl HeaderName {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderName::Type => TYPE_HEADER,
            HeaderName::CorrelationId => CORRELATION_ID_HEADER,
            HeaderName::ReplyTo => REPLY_TO_HEADER,
        }
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderName {
    type Err = ShimError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            TYPE_HEADER => Ok(HeaderName::Type),
            CORRELATION_ID_HEADER => Ok(HeaderName::CorrelationId),
            REPLY_TO_HEADER => Ok(HeaderName::ReplyTo),
            other => Err(ShimError::Argument(format!("unknown header \"{}\"", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    String(String),
    Bytes(Vec<u8>),
    Destination(JmsDestinationType, String),
}

impl HeaderValue {
    /// Tag naming how the value is encoded
    pub fn encoding(&self) -> &'static str {
        match self {
            HeaderValue::String(_) => "string",
            HeaderValue::Bytes(_) => "bytes",
            HeaderValue::Destination(JmsDestinationType::Queue, _) => "queue",
            HeaderValue::Destination(JmsDestinationType::Topic, _) => "topic",
            HeaderValue::Destination(JmsDestinationType::TemporaryQueue, _) => "temp_queue",
            HeaderValue::Destination(JmsDestinationType::TemporaryTopic, _) => "temp_topic",
        }
    }

    /// Text of the value as it appears in JSON, bytes in base64
    pub fn text(&self) -> String {
        match self {
            HeaderValue::String(text) | HeaderValue::Destination(_, text) => text.clone(),
            HeaderValue::Bytes(bytes) => STANDARD.encode(bytes),
        }
    }
}

/// A header with its encoding tag and value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    pub name: HeaderName,
    pub value: HeaderValue,
}

impl HeaderEntry {
    pub fn new(name: HeaderName, value: HeaderValue) -> Self {
        HeaderEntry { name, value }
    }

    /// Reads one `{"<encoding>": "<value>"}` entry of the sender's header map.
    pub fn parse(name: &str, encoding: &str, value: &str) -> ShimResult<HeaderEntry> {
        let name: HeaderName = name.parse()?;
        let value = match (name, encoding) {
            (HeaderName::Type, "string") | (HeaderName::CorrelationId, "string") => {
                HeaderValue::String(value.to_owned())
            }
            (HeaderName::CorrelationId, "bytes") => {
                HeaderValue::Bytes(STANDARD.decode(value).map_err(|err| {
                    ShimError::Argument(format!("{} bytes \"{}\": {}", name, value, err))
                })?)
            }
            (HeaderName::ReplyTo, "queue") => {
                HeaderValue::Destination(JmsDestinationType::Queue, value.to_owned())
            }
            (HeaderName::ReplyTo, "topic") => {
                HeaderValue::Destination(JmsDestinationType::Topic, value.to_owned())
            }
            (HeaderName::ReplyTo, "temp_queue") => {
                HeaderValue::Destination(JmsDestinationType::TemporaryQueue, value.to_owned())
            }
            (HeaderName::ReplyTo, "temp_topic") => {
                HeaderValue::Destination(JmsDestinationType::TemporaryTopic, value.to_owned())
            }
            (name, encoding) => {
                return Err(ShimError::Argument(format!(
                    "unsupported encoding \"{}\" for {}",
                    encoding, name
                )))
            }
        };
        Ok(HeaderEntry { name, value })
    }
}

/// Named booleans of the receiver parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveFlags {
    pub correlation_id_as_bytes: bool,
    pub reply_to_as_topic: bool,
    pub client_checks: bool,
}

impl ReceiveFlags {
    /// Sets a flag by its JSON name, ignoring names it does not know.
    pub fn set(&mut self, name: &str, value: bool) {
        match name {
            CORRELATION_ID_AS_BYTES_FLAG => self.correlation_id_as_bytes = value,
            REPLY_TO_AS_TOPIC_FLAG => self.reply_to_as_topic = value,
            CLIENT_CHECKS_FLAG => self.client_checks = value,
            other => debug!("Ignoring receiver flag {}", other),
        }
    }
}

/// Headers of a batch, with reply-to destinations already created
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutgoingHeaders {
    jms_type: Option<String>,
    correlation_id: Option<MessageId>,
    reply_to: Option<Destination>,
}

impl OutgoingHeaders {
    /// Creates reply-to destinations through `channel`; temporary ones get a
    /// broker assigned name.
    pub async fn resolve<C>(entries: &[HeaderEntry], channel: &mut C) -> ShimResult<Self>
    where
        C: Channel + ?Sized,
    {
        let mut headers = OutgoingHeaders::default();
        for entry in entries {
            match &entry.value {
                HeaderValue::String(text) if entry.name == HeaderName::Type => {
                    headers.jms_type = Some(text.clone())
                }
                HeaderValue::String(text) => {
                    headers.correlation_id = Some(MessageId::String(text.clone()))
                }
                HeaderValue::Bytes(bytes) => {
                    headers.correlation_id = Some(MessageId::Binary(bytes.clone()))
                }
                HeaderValue::Destination(kind, name) => {
                    let destination = channel.create_destination(*kind, name).await?;
                    debug!("Reply-to destination {} ({:?})", destination, kind);
                    headers.reply_to = Some(destination);
                }
            }
        }
        Ok(headers)
    }

    pub fn reply_to(&self) -> Option<&Destination> {
        self.reply_to.as_ref()
    }

    /// Sets the producer assigned headers of a message sent to `queue`
    /// together with the batch headers.
    pub fn stamp(&self, builder: MessageBuilder, queue: &str) -> MessageBuilder {
        let mut properties = builder
            .durable(false)
            .priority(DEFAULT_PRIORITY)
            .properties()
            .message_id(MessageId::String(format!("ID:{}", Uuid::new_v4())))
            .to(queue)
            .creation_time(Timestamp::now());
        if let Some(jms_type) = &self.jms_type {
            properties = properties.subject(jms_type.clone());
        }
        if let Some(correlation_id) = &self.correlation_id {
            properties = properties.correlation_id(correlation_id.clone());
        }
        if let Some(reply_to) = &self.reply_to {
            properties = properties.reply_to(reply_to.name());
        }

        let mut annotations = properties
            .message_builder()
            .message_annotations()
            .insert(JMS_DEST, JmsDestinationType::Queue);
        if let Some(reply_to) = &self.reply_to {
            annotations = annotations.insert(JMS_REPLY_TO, reply_to.kind());
        }
        annotations.message_builder()
    }
}

fn correlation_text(id: &MessageId) -> String {
    match id {
        MessageId::String(text) => text.clone(),
        MessageId::Binary(bytes) => format!("{}{}", BINARY_ID_PREFIX, hex::encode_upper(bytes)),
        MessageId::Uuid(uuid) => format!("ID:AMQP_UUID:{}", uuid),
        MessageId::ULong(id) => format!("ID:AMQP_ULONG:{}", id),
        MessageId::Long(id) => format!("ID:AMQP_LONG:{}", id),
    }
}

fn correlation_bytes(id: &MessageId) -> Vec<u8> {
    match id {
        MessageId::Binary(bytes) => bytes.clone(),
        other => correlation_text(other).into_bytes(),
    }
}

/// Header entries present on a received message, shaped by `flags`.
pub fn extract(message: &Message, flags: &ReceiveFlags) -> Vec<HeaderEntry> {
    let mut entries = Vec::with_capacity(3);
    let properties = match message.properties() {
        Some(properties) => properties,
        None => return entries,
    };

    if let Some(subject) = &properties.subject {
        entries.push(HeaderEntry::new(
            HeaderName::Type,
            HeaderValue::String(subject.clone()),
        ));
    }
    if let Some(id) = &properties.correlation_id {
        let value = if flags.correlation_id_as_bytes {
            HeaderValue::Bytes(correlation_bytes(id))
        } else {
            HeaderValue::String(correlation_text(id))
        };
        entries.push(HeaderEntry::new(HeaderName::CorrelationId, value));
    }
    if let Some(reply_to) = &properties.reply_to {
        let kind = if flags.reply_to_as_topic {
            JmsDestinationType::Topic
        } else {
            JmsDestinationType::Queue
        };
        entries.push(HeaderEntry::new(
            HeaderName::ReplyTo,
            HeaderValue::Destination(kind, reply_to.clone()),
        ));
    }
    trace!("Extracted {} headers", entries.len());
    entries
}

/// Checks the headers a compliant JMS producer sets: destination, delivery
/// mode, expiration, priority and a creation time within a minute of now.
pub fn validate(message: &Message, queue: &str, now_millis: i64) -> ShimResult<()> {
    let properties = message.properties().cloned().unwrap_or_default();
    let header = message.header().cloned().unwrap_or_default();

    let destination = properties.to.unwrap_or_default();
    if destination != queue {
        return Err(ShimError::header(
            "JMS_DESTINATION",
            format!("found \"{}\"; expected \"{}\"", destination, queue),
        ));
    }

    // durable maps onto PERSISTENT, its absence onto NON_PERSISTENT
    trace!(
        "Delivery mode {}",
        if header.durable {
            "PERSISTENT"
        } else {
            "NON_PERSISTENT"
        }
    );

    let expiry = properties
        .absolute_expiry_time
        .map(|time| time.millis())
        .unwrap_or(0);
    if expiry != 0 || header.ttl.map_or(false, |ttl| ttl != 0) {
        return Err(ShimError::header("JMS_EXPIRATION", "header is non-zero"));
    }

    if header.priority != DEFAULT_PRIORITY {
        return Err(ShimError::header(
            "JMS_PRIORITY",
            format!(
                "header is not default ({}): found {}",
                DEFAULT_PRIORITY, header.priority
            ),
        ));
    }

    let timestamp = properties
        .creation_time
        .map(|time| time.millis())
        .unwrap_or(0);
    let skew = (i128::from(now_millis) - i128::from(timestamp)).abs();
    if skew > i128::from(MAX_TIMESTAMP_SKEW_MS) {
        return Err(ShimError::header(
            "JMS_TIMESTAMP",
            format!(
                "found {} is not within 1 minute of {}",
                timestamp, now_millis
            ),
        ));
    }
    Ok(())
}
