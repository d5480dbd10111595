#[cfg(test)]
use fake::Fake;

use super::{
    codec::constants::MESSAGE_HEADER,
    types::{described_list, Milliseconds},
};

/// Transport header, `durable` doubles as the JMS delivery mode
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(test, derive(fake::Dummy))]
pub struct Header {
    pub durable: bool,
    pub priority: u8,
    pub ttl: Option<Milliseconds>,
    pub first_acquirer: bool,
    pub delivery_count: u32,
}

/// Defaults of an absent header: not durable, priority 4.
impl Default for Header {
    fn default() -> Self {
        Self {
            durable: false,
            priority: 4,
            ttl: None,
            first_acquirer: false,
            delivery_count: 0,
        }
    }
}

described_list!(
    Header,
    MESSAGE_HEADER,
    [durable, priority, ttl, first_acquirer, delivery_count]
);
