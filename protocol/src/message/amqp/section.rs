use std::io::Write;

use super::{
    codec::constants::{
        MESSAGE_ANNOTATIONS, MESSAGE_APPLICATION_PROPERTIES, MESSAGE_BODY_DATA,
        MESSAGE_BODY_SEQUENCE, MESSAGE_BODY_VALUE, MESSAGE_DELIVERY_ANNOTATIONS, MESSAGE_FOOTER,
        MESSAGE_HEADER, MESSAGE_PROPERTIES,
    },
    header::Header,
    properties::Properties,
    types::{
        AmqpSequence, AmqpValue, ApplicationProperties, Binary, DeliveryAnnotations, Descriptor,
        Footer, MessageAnnotations,
    },
    AmqpDecodeError, AmqpDecoder, AmqpEncodeError, AmqpEncoder,
};
use crate::codec::decoder::MapDecoded;

/// One section of a bare or annotated message
#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum MessageSection {
    Header(Header),
    DeliveryAnnotations(DeliveryAnnotations),
    MessageAnnotations(MessageAnnotations),
    Properties(Properties),
    ApplicationProperties(ApplicationProperties),
    Data(Binary),
    AmqpSequence(AmqpSequence),
    AmqpValue(AmqpValue),
    Footer(Footer),
}

impl AmqpDecoder for MessageSection {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (body, descriptor) = Descriptor::decode(input)?;
        // header and properties read their own descriptor
        if descriptor == MESSAGE_HEADER {
            return Header::decode(input).map_decoded(MessageSection::Header);
        }
        if descriptor == MESSAGE_PROPERTIES {
            return Properties::decode(input).map_decoded(MessageSection::Properties);
        }

        if descriptor == MESSAGE_DELIVERY_ANNOTATIONS {
            DeliveryAnnotations::decode(body).map_decoded(MessageSection::DeliveryAnnotations)
        } else if descriptor == MESSAGE_ANNOTATIONS {
            MessageAnnotations::decode(body).map_decoded(MessageSection::MessageAnnotations)
        } else if descriptor == MESSAGE_APPLICATION_PROPERTIES {
            ApplicationProperties::decode(body).map_decoded(MessageSection::ApplicationProperties)
        } else if descriptor == MESSAGE_BODY_DATA {
            Binary::decode(body).map_decoded(MessageSection::Data)
        } else if descriptor == MESSAGE_BODY_SEQUENCE {
            AmqpSequence::decode(body).map_decoded(MessageSection::AmqpSequence)
        } else if descriptor == MESSAGE_BODY_VALUE {
            AmqpValue::decode(body).map_decoded(MessageSection::AmqpValue)
        } else if descriptor == MESSAGE_FOOTER {
            Footer::decode(body).map_decoded(MessageSection::Footer)
        } else {
            Err(AmqpDecodeError::MessageParse(format!(
                "unknown message section {:?}",
                descriptor
            )))
        }
    }
}

/// Encoded size of an optional section written as `descriptor` + `value`.
pub(crate) fn section_size<T: AmqpEncoder>(descriptor: &Descriptor, value: Option<&T>) -> u32 {
    value.map_or(0, |value| descriptor.encoded_size() + value.encoded_size())
}

pub(crate) fn write_section<T: AmqpEncoder>(
    writer: &mut impl Write,
    descriptor: &Descriptor,
    value: Option<&T>,
) -> Result<(), AmqpEncodeError> {
    if let Some(value) = value {
        descriptor.encode(writer)?;
        value.encode(writer)?;
    }
    Ok(())
}
