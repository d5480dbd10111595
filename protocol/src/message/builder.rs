use super::Message;

use super::amqp::{
    Address, AmqpMessage, AnnotationKey, Annotations, List, MessageId, SimpleValue, Str, Symbol,
    Timestamp, Value,
};

pub struct MessageBuilder(pub(crate) AmqpMessage);

impl MessageBuilder {
    /// Single `data` section body
    pub fn body(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.0.set_body(|body| {
            body.set_data(data);
        });
        self
    }

    /// `amqp-value` body
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.0.set_body(|body| {
            body.set_value(value);
        });
        self
    }

    /// Single `amqp-sequence` section body
    pub fn sequence(mut self, sequence: impl Into<List>) -> Self {
        self.0.set_body(|body| {
            body.set_sequence(sequence);
        });
        self
    }

    pub fn durable(mut self, durable: bool) -> Self {
        self.0.with_header(|header| header.durable = durable);
        self
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.0.with_header(|header| header.priority = priority);
        self
    }

    pub fn properties(self) -> PropertiesBuilder {
        PropertiesBuilder(self)
    }

    pub fn message_annotations(self) -> AnnotationBuilder {
        AnnotationBuilder(
            self,
            Box::new(|builder| builder.0.message_annotations_mut()),
        )
    }

    pub fn delivery_annotations(self) -> AnnotationBuilder {
        AnnotationBuilder(
            self,
            Box::new(|builder| builder.0.delivery_annotations_mut()),
        )
    }

    pub fn application_properties(self) -> ApplicationPropertiesBuilder {
        ApplicationPropertiesBuilder(self)
    }

    pub fn build(self) -> Message {
        Message::from(self.0)
    }
}

pub struct PropertiesBuilder(MessageBuilder);

macro_rules! property_setter {
    ($name:ident, $ty:ty) => {
        pub fn $name(mut self, value: impl Into<$ty>) -> Self {
            self.0
                 .0
                .with_properties(|p| p.$name = Some(value.into()));
            self
        }
    };
}

impl PropertiesBuilder {
    pub fn message_builder(self) -> MessageBuilder {
        self.0
    }

    property_setter!(message_id, MessageId);
    property_setter!(user_id, Vec<u8>);
    property_setter!(to, Address);
    property_setter!(subject, String);
    property_setter!(reply_to, Address);
    property_setter!(correlation_id, MessageId);
    property_setter!(content_type, Symbol);
    property_setter!(content_encoding, Symbol);
    property_setter!(absolute_expiry_time, Timestamp);
    property_setter!(creation_time, Timestamp);
    property_setter!(group_id, String);
    property_setter!(reply_to_group_id, String);
}

type AnnotationSelector = Box<dyn Fn(&mut MessageBuilder) -> &mut Annotations>;

pub struct AnnotationBuilder(MessageBuilder, AnnotationSelector);

impl AnnotationBuilder {
    pub fn insert<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<AnnotationKey>,
        V: Into<Value>,
    {
        let annotations = self.1(&mut self.0);
        annotations.put(key, value);
        self
    }
    pub fn message_builder(self) -> MessageBuilder {
        self.0
    }
}

pub struct ApplicationPropertiesBuilder(MessageBuilder);

impl ApplicationPropertiesBuilder {
    pub fn insert<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<Str>,
        V: Into<SimpleValue>,
    {
        let app_properties = self.0 .0.application_properties_mut();
        app_properties.insert(key.into(), value.into());
        self
    }
    pub fn message_builder(self) -> MessageBuilder {
        self.0
    }
}
