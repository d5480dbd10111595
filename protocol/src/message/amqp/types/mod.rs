mod annotations;
mod descriptor;
mod message_id;
mod primitives;
mod symbol;

pub use annotations::{AnnotationKey, Annotations};
pub use descriptor::Descriptor;
pub use message_id::MessageId;
pub use primitives::*;
pub(crate) use primitives::{decode_field, described_list, expect_descriptor, read_list_header};
pub use symbol::Symbol;

pub type Milliseconds = u32;
pub type SequenceNo = u32;
pub type Address = Str;

pub type DeliveryAnnotations = Annotations;
pub type MessageAnnotations = Annotations;
pub type Footer = Annotations;
pub type ApplicationProperties = Map<Str, SimpleValue>;

pub type AmqpSequence = List;
pub type AmqpValue = Value;
