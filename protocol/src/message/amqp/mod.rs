mod body;
mod codec;
mod error;
mod header;
mod message;
mod properties;
mod section;
mod types;

pub use body::MessageBody;
pub use codec::{constants::TypeCode, AmqpDecoder, AmqpEncoder};
pub use error::{AmqpDecodeError, AmqpEncodeError};

pub use header::Header;
pub use message::Message as AmqpMessage;
pub use properties::Properties;
pub use types::{
    Address, AnnotationKey, Annotations, ApplicationProperties, Binary, CollectionValue,
    Decimal128, Decimal32, Decimal64, DeliveryAnnotations, DescribedValue, Descriptor, Double,
    Float, Footer, List, Map, MessageAnnotations, MessageId, SimpleValue, Str, Symbol,
    Timestamp, Uuid, Value,
};
