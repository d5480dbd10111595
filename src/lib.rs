//! Sender and receiver shims for AMQP broker interoperability tests.
//!
//! A shim turns canonical test values into messages of one JMS message
//! shape, sends or receives a batch of them and reports what arrived in the
//! same canonical form, so drivers written in other languages can compare.
pub mod channel;
pub mod cli;
pub mod codec;
pub mod driver;
pub mod error;
pub mod headers;
pub mod object;
pub mod options;
pub mod properties;
pub mod shape;
pub mod subtype;
pub mod vector;

pub type ShimResult<T> = Result<T, error::ShimError>;

pub use crate::channel::{Channel, Connector, Destination, LoopbackBroker, SpoolBroker};
pub use crate::options::ShimOptions;
pub use crate::shape::MessageShape;
pub use crate::subtype::Subtype;

pub mod types {
    pub use crate::codec::NativeValue;
    pub use crate::headers::{HeaderEntry, HeaderName, HeaderValue, ReceiveFlags};
    pub use crate::object::ObjectValue;
    pub use crate::properties::PropertyEntry;
    pub use crate::shape::{Reading, Slot};
    pub use crate::vector::{ReceiveReport, ReceiveRequest, SendRequest};
    pub use interop_shims_protocol::message::Message;
}
