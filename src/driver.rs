//! Batch loops: one message per test value on the way out, exactly the
//! expected number of messages per key on the way in.
use std::time::Duration;

use interop_shims_protocol::message::{MessageBuilder, Timestamp};
use serde_json::Value as JsonValue;
use tracing::{debug, error, info, trace};

use crate::{
    channel::{Channel, Connector},
    codec::{self, NativeValue},
    error::ShimError,
    headers::{self, OutgoingHeaders},
    object::{self, ObjectValue},
    properties,
    shape::{MessageShape, Reading, Slot},
    subtype::Subtype,
    vector::{ReceiveReport, ReceiveRequest, SendRequest},
    ShimResult,
};

/// Key of the plain message shape, which carries no value
pub const PLAIN_KEY: &str = "none";

/// How the values under one test vector key are carried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Canonical values of one subtype
    Typed(Subtype),
    /// Constructor arguments of one registered object type, read back in
    /// their describe form
    Object(&'static str),
}

impl Column {
    /// Interprets a test vector key for `shape`.
    pub fn resolve(shape: MessageShape, key: &str) -> ShimResult<Column> {
        let column = match shape {
            MessageShape::Plain if key == PLAIN_KEY => Column::Typed(Subtype::Null),
            MessageShape::Plain => {
                return Err(ShimError::Argument(format!(
                    "unexpected {} sub-type \"{}\"",
                    shape, key
                )))
            }
            MessageShape::Text => Column::Typed(Subtype::String),
            MessageShape::SingleObject => match object::REGISTERED_TYPES
                .iter()
                .find(|type_name| **type_name == key)
            {
                Some(type_name) => Column::Object(*type_name),
                None => Column::Typed(key.parse()?),
            },
            _ => Column::Typed(key.parse()?),
        };
        shape.check(column.subtype())?;
        Ok(column)
    }

    pub fn subtype(&self) -> Subtype {
        match self {
            Column::Typed(subtype) => *subtype,
            Column::Object(_) => Subtype::Object,
        }
    }

    pub fn decode(&self, canonical: &str) -> ShimResult<NativeValue> {
        match self {
            Column::Typed(subtype) => codec::decode(*subtype, canonical),
            Column::Object(type_name) => Ok(NativeValue::Object(ObjectValue::construct(
                type_name, canonical,
            )?)),
        }
    }

    /// Canonical text of `reading`
    pub fn canonical(&self, shape: MessageShape, reading: &Reading) -> ShimResult<String> {
        match (self, reading) {
            (Column::Object(_), Reading::Value(NativeValue::Object(object))) => {
                Ok(object.describe())
            }
            _ => shape.render(self.subtype(), reading),
        }
    }

    /// JSON value the receiver reports for `reading`; plain messages report
    /// `null`.
    pub fn render(&self, shape: MessageShape, reading: &Reading) -> ShimResult<JsonValue> {
        if shape == MessageShape::Plain {
            return Ok(JsonValue::Null);
        }
        self.canonical(shape, reading).map(JsonValue::String)
    }
}

/// Message body of one test value, with the test properties attached
pub struct PreparedMessage {
    pub key: String,
    pub index: usize,
    pub body: MessageBuilder,
}

/// Resolves every key and seals every value of `request` into its body, so
/// a bad key or value fails before anything is sent.
pub fn prepare_batch(
    shape: MessageShape,
    request: &SendRequest,
) -> ShimResult<Vec<PreparedMessage>> {
    let mut prepared = Vec::new();
    for (key, values) in &request.values {
        let column = Column::resolve(shape, key)?;
        for (index, canonical) in values.iter().enumerate() {
            let value = column.decode(canonical)?;
            let mut writer = shape.writer();
            writer.write(Slot::new(column.subtype(), index), &value)?;
            prepared.push(PreparedMessage {
                key: key.clone(),
                index,
                body: properties::attach(writer.seal()?, &request.properties)?,
            });
        }
    }
    Ok(prepared)
}

/// Sends every value of `request` as its own message and returns how many
/// were sent.
pub async fn send_batch<C>(
    channel: &mut C,
    shape: MessageShape,
    request: &SendRequest,
) -> ShimResult<usize>
where
    C: Channel + ?Sized,
{
    let prepared = prepare_batch(shape, request)?;
    let outgoing = OutgoingHeaders::resolve(&request.headers, channel).await?;
    let queue = channel.queue().to_owned();
    debug!("Sending {} message(s) as {}", prepared.len(), shape);

    let mut sent = 0;
    for PreparedMessage { key, index, body } in prepared {
        channel.send(outgoing.stamp(body, &queue).build()).await?;
        sent += 1;
        trace!("Sent {}[{}]", key, index);
    }
    Ok(sent)
}

/// Receives the expected number of messages per key, in key order.
pub async fn receive_batch<C>(
    channel: &mut C,
    shape: MessageShape,
    request: &ReceiveRequest,
    timeout: Duration,
) -> ShimResult<ReceiveReport>
where
    C: Channel + ?Sized,
{
    let mut report = ReceiveReport::new(request.legacy);
    let queue = channel.queue().to_owned();

    for (key, expected) in &request.counts {
        let column = Column::resolve(shape, key)?;
        report.open_key(key);
        debug!("Receiving {} {} message(s) as {}", expected, key, shape);

        for index in 0..*expected {
            let message = channel.receive(timeout).await?.ok_or_else(|| {
                ShimError::ProtocolTimeout {
                    subtype: key.clone(),
                    expected: *expected,
                    received: index,
                }
            })?;

            if request.flags.client_checks {
                headers::validate(&message, &queue, Timestamp::now().millis())?;
            }
            let mut reader = shape.reader(&message)?;
            let reading = reader.read(Slot::new(column.subtype(), index))?;
            report.push_value(key, column.render(shape, &reading)?);

            if !request.legacy {
                report.record_headers(&headers::extract(&message, &request.flags));
                report.record_properties(&properties::extract(&message))?;
            }
        }
    }
    Ok(report)
}

async fn finish<C, T>(channel: &mut C, outcome: ShimResult<T>) -> ShimResult<T>
where
    C: Channel + ?Sized,
{
    let closed = channel.close().await;
    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), closed) => {
            if let Err(close_err) = closed {
                error!("Closing after a failed batch also failed: {}", close_err);
            }
            Err(err)
        }
    }
}

/// Connects to `queue`, sends the batch and closes the channel whatever the
/// outcome.
pub async fn run_sender<K>(
    connector: &K,
    queue: &str,
    shape: MessageShape,
    request: &SendRequest,
) -> ShimResult<usize>
where
    K: Connector,
{
    let mut channel = connector.connect(queue).await?;
    let outcome = send_batch(&mut channel, shape, request).await;
    let sent = finish(&mut channel, outcome).await?;
    info!("Sent {} message(s) to {}", sent, queue);
    Ok(sent)
}

/// Connects to `queue`, receives the batch and closes the channel whatever
/// the outcome.
pub async fn run_receiver<K>(
    connector: &K,
    queue: &str,
    shape: MessageShape,
    request: &ReceiveRequest,
    timeout: Duration,
) -> ShimResult<ReceiveReport>
where
    K: Connector,
{
    let mut channel = connector.connect(queue).await?;
    let outcome = receive_batch(&mut channel, shape, request, timeout).await;
    let report = finish(&mut channel, outcome).await?;
    info!("Received a batch of {} key(s) from {}", request.counts.len(), queue);
    Ok(report)
}

/// Shape and column carrying a value of an AMQP primitive type
pub fn amqp_column(subtype: Subtype) -> ShimResult<(MessageShape, Column)> {
    let carrier = match subtype {
        Subtype::String => (MessageShape::Text, Column::Typed(Subtype::String)),
        Subtype::Uuid => (MessageShape::SingleObject, Column::Object(object::UUID_TYPE)),
        Subtype::Decimal32 => (
            MessageShape::SingleObject,
            Column::Object(object::DECIMAL32_TYPE),
        ),
        Subtype::Decimal64 => (
            MessageShape::SingleObject,
            Column::Object(object::DECIMAL64_TYPE),
        ),
        Subtype::Decimal128 => (
            MessageShape::SingleObject,
            Column::Object(object::DECIMAL128_TYPE),
        ),
        other if other.is_compound() || other == Subtype::Object || other == Subtype::Bytes => {
            return Err(ShimError::unsupported(other.as_str(), "the AMQP type shims"))
        }
        other => (MessageShape::RawBytes, Column::Typed(other)),
    };
    Ok(carrier)
}

/// Seals each of `values` into a message body before anything is sent.
pub fn prepare_amqp_values(
    subtype: Subtype,
    values: &[String],
) -> ShimResult<Vec<MessageBuilder>> {
    let (shape, column) = amqp_column(subtype)?;
    values
        .iter()
        .enumerate()
        .map(|(index, canonical)| {
            let value = column.decode(canonical)?;
            let mut writer = shape.writer();
            writer.write(Slot::new(column.subtype(), index), &value)?;
            writer.seal()
        })
        .collect()
}

/// Sends `values` of one AMQP primitive type.
pub async fn send_amqp_values<C>(
    channel: &mut C,
    subtype: Subtype,
    values: &[String],
) -> ShimResult<usize>
where
    C: Channel + ?Sized,
{
    let bodies = prepare_amqp_values(subtype, values)?;
    let queue = channel.queue().to_owned();
    let stamp = OutgoingHeaders::default();

    for body in bodies {
        channel.send(stamp.stamp(body, &queue).build()).await?;
    }
    Ok(values.len())
}

/// Receives `count` values of one AMQP primitive type, in canonical form.
pub async fn receive_amqp_values<C>(
    channel: &mut C,
    subtype: Subtype,
    count: usize,
    timeout: Duration,
) -> ShimResult<Vec<String>>
where
    C: Channel + ?Sized,
{
    let (shape, column) = amqp_column(subtype)?;
    let mut values = Vec::new();

    for index in 0..count {
        let message = channel
            .receive(timeout)
            .await?
            .ok_or_else(|| ShimError::ProtocolTimeout {
                subtype: subtype.to_string(),
                expected: count,
                received: index,
            })?;
        let reading = shape
            .reader(&message)?
            .read(Slot::new(column.subtype(), index))?;
        values.push(column.canonical(shape, &reading)?);
    }
    Ok(values)
}

/// [`send_amqp_values`] over a fresh channel that is always closed.
pub async fn run_amqp_sender<K>(
    connector: &K,
    queue: &str,
    subtype: Subtype,
    values: &[String],
) -> ShimResult<usize>
where
    K: Connector,
{
    amqp_column(subtype)?;
    let mut channel = connector.connect(queue).await?;
    let outcome = send_amqp_values(&mut channel, subtype, values).await;
    finish(&mut channel, outcome).await
}

/// [`receive_amqp_values`] over a fresh channel that is always closed.
pub async fn run_amqp_receiver<K>(
    connector: &K,
    queue: &str,
    subtype: Subtype,
    count: usize,
    timeout: Duration,
) -> ShimResult<Vec<String>>
where
    K: Connector,
{
    amqp_column(subtype)?;
    let mut channel = connector.connect(queue).await?;
    let outcome = receive_amqp_values(&mut channel, subtype, count, timeout).await;
    finish(&mut channel, outcome).await
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{amqp_column, Column};
    use crate::{
        error::ShimError,
        object::{DECIMAL64_TYPE, INTEGER_TYPE, UUID_TYPE},
        shape::{MessageShape, Reading},
        subtype::Subtype,
    };

    #[test]
    fn keys_resolve_per_shape() {
        assert_eq!(
            Column::Typed(Subtype::Null),
            Column::resolve(MessageShape::Plain, "none").unwrap()
        );
        assert!(Column::resolve(MessageShape::Plain, "int").is_err());
        assert_eq!(
            Column::Typed(Subtype::String),
            Column::resolve(MessageShape::Text, "text").unwrap()
        );
        assert_eq!(
            Column::Object(INTEGER_TYPE),
            Column::resolve(MessageShape::SingleObject, "java.lang.Integer").unwrap()
        );
        assert_eq!(
            Column::Typed(Subtype::Object),
            Column::resolve(MessageShape::SingleObject, "object").unwrap()
        );
        assert!(matches!(
            Column::resolve(MessageShape::OrderedMap, "ulong"),
            Err(ShimError::UnsupportedSubtype { .. })
        ));
        assert!(matches!(
            Column::resolve(MessageShape::Stream, "float128"),
            Err(ShimError::Argument(_))
        ));
    }

    #[test]
    fn object_columns_report_the_describe_form() {
        let column = Column::Object(INTEGER_TYPE);
        let value = column.decode("-12").unwrap();
        assert_eq!(
            json!("-12"),
            column
                .render(MessageShape::SingleObject, &Reading::Value(value.clone()))
                .unwrap()
        );
        assert_eq!(
            json!("java.lang.Integer:-12"),
            Column::Typed(Subtype::Object)
                .render(MessageShape::SingleObject, &Reading::Value(value))
                .unwrap()
        );
    }

    #[test]
    fn amqp_types_pick_their_carrier() {
        assert_eq!(
            (MessageShape::RawBytes, Column::Typed(Subtype::Null)),
            amqp_column(Subtype::Null).unwrap()
        );
        assert_eq!(
            (MessageShape::SingleObject, Column::Object(UUID_TYPE)),
            amqp_column(Subtype::Uuid).unwrap()
        );
        assert_eq!(
            (MessageShape::SingleObject, Column::Object(DECIMAL64_TYPE)),
            amqp_column(Subtype::Decimal64).unwrap()
        );
        assert_eq!(
            MessageShape::Text,
            amqp_column(Subtype::String).unwrap().0
        );
        for compound in [Subtype::List, Subtype::Map, Subtype::Array].iter() {
            assert!(matches!(
                amqp_column(*compound),
                Err(ShimError::UnsupportedSubtype { .. })
            ));
        }
    }
}
