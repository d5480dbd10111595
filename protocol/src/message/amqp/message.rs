use std::io::Write;

use super::{
    body::MessageBody,
    codec::constants::{
        MESSAGE_ANNOTATIONS, MESSAGE_APPLICATION_PROPERTIES, MESSAGE_DELIVERY_ANNOTATIONS,
        MESSAGE_FOOTER,
    },
    header::Header,
    properties::Properties,
    section::{section_size, write_section, MessageSection},
    types::{ApplicationProperties, DeliveryAnnotations, Footer, MessageAnnotations},
    AmqpDecodeError, AmqpDecoder, AmqpEncodeError, AmqpEncoder,
};

#[cfg(test)]
use fake::Fake;

/// Annotated AMQP message. The optional sections are created on first
/// mutable access.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(test, derive(fake::Dummy))]
pub struct Message {
    header: Option<Header>,
    delivery_annotations: Option<DeliveryAnnotations>,
    message_annotations: Option<MessageAnnotations>,
    properties: Option<Properties>,
    application_properties: Option<ApplicationProperties>,
    body: MessageBody,
    footer: Option<Footer>,
}

impl Message {
    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn properties(&self) -> Option<&Properties> {
        self.properties.as_ref()
    }

    pub fn message_annotations(&self) -> Option<&MessageAnnotations> {
        self.message_annotations.as_ref()
    }

    pub fn delivery_annotations(&self) -> Option<&DeliveryAnnotations> {
        self.delivery_annotations.as_ref()
    }

    pub fn application_properties(&self) -> Option<&ApplicationProperties> {
        self.application_properties.as_ref()
    }

    pub fn footer(&self) -> Option<&Footer> {
        self.footer.as_ref()
    }

    pub fn set_body(&mut self, update: impl FnOnce(&mut MessageBody)) -> &mut Self {
        update(&mut self.body);
        self
    }

    pub fn with_header(&mut self, update: impl FnOnce(&mut Header)) -> &mut Self {
        update(self.header.get_or_insert_with(Header::default));
        self
    }

    pub fn with_properties(&mut self, update: impl FnOnce(&mut Properties)) -> &mut Self {
        update(self.properties.get_or_insert_with(Properties::default));
        self
    }

    pub fn message_annotations_mut(&mut self) -> &mut MessageAnnotations {
        self.message_annotations.get_or_insert_with(Default::default)
    }

    pub fn delivery_annotations_mut(&mut self) -> &mut DeliveryAnnotations {
        self.delivery_annotations.get_or_insert_with(Default::default)
    }

    pub fn application_properties_mut(&mut self) -> &mut ApplicationProperties {
        self.application_properties.get_or_insert_with(Default::default)
    }

    pub fn footer_mut(&mut self) -> &mut Footer {
        self.footer.get_or_insert_with(Default::default)
    }
}

impl Message {
    /// Stores a decoded section. Body sections of the same kind accumulate.
    fn apply(&mut self, section: MessageSection) {
        match section {
            MessageSection::Header(header) => self.header = Some(header),
            MessageSection::DeliveryAnnotations(annotations) => {
                self.delivery_annotations = Some(annotations)
            }
            MessageSection::MessageAnnotations(annotations) => {
                self.message_annotations = Some(annotations)
            }
            MessageSection::Properties(properties) => self.properties = Some(properties),
            MessageSection::ApplicationProperties(properties) => {
                self.application_properties = Some(properties)
            }
            MessageSection::Data(data) => self.body.data.push(data),
            MessageSection::AmqpSequence(sequence) => self.body.sequence.push(sequence),
            MessageSection::AmqpValue(value) => self.body.value = Some(value),
            MessageSection::Footer(footer) => self.footer = Some(footer),
        }
    }
}

impl AmqpDecoder for Message {
    fn decode(mut input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        let mut message = Message::default();
        while !input.is_empty() {
            let (remaining, section) = MessageSection::decode(input)?;
            message.apply(section);
            input = remaining;
        }
        Ok((input, message))
    }
}

/// Sections are written in the order of the AMQP 1.0 message format.
impl AmqpEncoder for Message {
    fn encoded_size(&self) -> u32 {
        self.header.as_ref().map_or(0, Header::encoded_size)
            + section_size(&MESSAGE_DELIVERY_ANNOTATIONS, self.delivery_annotations.as_ref())
            + section_size(&MESSAGE_ANNOTATIONS, self.message_annotations.as_ref())
            + self.properties.as_ref().map_or(0, Properties::encoded_size)
            + section_size(
                &MESSAGE_APPLICATION_PROPERTIES,
                self.application_properties.as_ref(),
            )
            + self.body.encoded_size()
            + section_size(&MESSAGE_FOOTER, self.footer.as_ref())
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        if let Some(header) = &self.header {
            header.encode(writer)?;
        }
        write_section(writer, &MESSAGE_DELIVERY_ANNOTATIONS, self.delivery_annotations.as_ref())?;
        write_section(writer, &MESSAGE_ANNOTATIONS, self.message_annotations.as_ref())?;
        if let Some(properties) = &self.properties {
            properties.encode(writer)?;
        }
        write_section(
            writer,
            &MESSAGE_APPLICATION_PROPERTIES,
            self.application_properties.as_ref(),
        )?;
        self.body.encode(writer)?;
        write_section(writer, &MESSAGE_FOOTER, self.footer.as_ref())
    }
}
