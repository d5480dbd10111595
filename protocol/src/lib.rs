//! AMQP 1.0 message codec used by the interop shims.
//!
//! Covers the primitive and compound type system, the message sections and the
//! annotations a JMS client uses to describe message shapes and destinations.
pub mod codec;
pub mod error;
pub mod jms;
pub mod message;
