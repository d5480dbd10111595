use std::io::Write;

use super::{
    codec::constants::{MESSAGE_BODY_DATA, MESSAGE_BODY_SEQUENCE, MESSAGE_BODY_VALUE},
    section::{section_size, write_section},
    types::{List, Value},
    AmqpEncodeError, AmqpEncoder,
};

/// Body sections of a message: any number of `data` or `amqp-sequence`
/// sections, or a single `amqp-value`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBody {
    pub data: Vec<Vec<u8>>,
    pub sequence: Vec<List>,
    pub value: Option<Value>,
}

impl MessageBody {
    pub fn data(&self) -> Option<&Vec<u8>> {
        self.data.first()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn sequence(&self) -> Option<&List> {
        self.sequence.first()
    }

    pub fn set_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.value = Some(value.into());
        self
    }

    pub fn set_data(&mut self, data: impl Into<Vec<u8>>) -> &mut Self {
        self.data.clear();
        self.data.push(data.into());
        self
    }

    pub fn set_sequence(&mut self, sequence: impl Into<List>) -> &mut Self {
        self.sequence.clear();
        self.sequence.push(sequence.into());
        self
    }
}

impl AmqpEncoder for MessageBody {
    fn encoded_size(&self) -> u32 {
        let data: u32 = self
            .data
            .iter()
            .map(|data| section_size(&MESSAGE_BODY_DATA, Some(data)))
            .sum();
        let sequence: u32 = self
            .sequence
            .iter()
            .map(|sequence| section_size(&MESSAGE_BODY_SEQUENCE, Some(sequence)))
            .sum();
        data + sequence + section_size(&MESSAGE_BODY_VALUE, self.value.as_ref())
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        for data in &self.data {
            write_section(writer, &MESSAGE_BODY_DATA, Some(data))?;
        }
        for sequence in &self.sequence {
            write_section(writer, &MESSAGE_BODY_SEQUENCE, Some(sequence))?;
        }
        write_section(writer, &MESSAGE_BODY_VALUE, self.value.as_ref())
    }
}
