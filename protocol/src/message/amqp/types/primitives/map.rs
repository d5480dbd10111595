use std::{fmt::Debug, hash::Hash, io::Write, iter::FromIterator, ops::Deref};

use indexmap::IndexMap;

use crate::message::amqp::{
    codec::{
        compound_header_size, constants::TypeCode, read_compound_count, write_compound_header,
    },
    AmqpDecodeError, AmqpDecoder, AmqpEncodeError, AmqpEncoder,
};

/// AMQP map preserving insertion order, so a message encodes to the same
/// bytes every time it is written.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Map<K, V>(pub(crate) IndexMap<K, V>)
where
    K: Eq + Hash,
    V: PartialEq;

impl<K, V> Default for Map<K, V>
where
    K: Eq + Hash,
    V: PartialEq,
{
    fn default() -> Self {
        Self(IndexMap::new())
    }
}

impl<K, V> Map<K, V>
where
    K: Eq + Hash,
    V: PartialEq,
{
    pub fn insert(&mut self, key: impl Into<K>, value: impl Into<V>) -> Option<V> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes the entry keeping the order of the others.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.shift_remove(key)
    }
}

impl<K, V> Map<K, V>
where
    K: Eq + Hash + AmqpEncoder,
    V: PartialEq + AmqpEncoder,
{
    fn content_size(&self) -> u32 {
        self.0
            .iter()
            .map(|(key, value)| key.encoded_size() + value.encoded_size())
            .sum()
    }
}

impl<K, V> Deref for Map<K, V>
where
    K: Eq + Hash,
    V: PartialEq,
{
    type Target = IndexMap<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K, V> FromIterator<(K, V)> for Map<K, V>
where
    K: Eq + Hash,
    V: PartialEq,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Map(iter.into_iter().collect())
    }
}

impl<K, V> AmqpDecoder for Map<K, V>
where
    K: Eq + Hash + AmqpDecoder + Debug,
    V: PartialEq + AmqpDecoder + Debug,
{
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (input, code) = TypeCode::decode(input)?;
        let (mut input, count) =
            read_compound_count::<Self>(input, code, TypeCode::Map8, TypeCode::Map32)?;
        if count % 2 != 0 {
            return Err(AmqpDecodeError::parse_error(format!(
                "map with odd element count {}",
                count
            )));
        }

        let mut map = IndexMap::new();
        for _ in 0..count / 2 {
            let (remaining, key) = K::decode(input)?;
            let (remaining, value) = V::decode(remaining)?;
            map.insert(key, value);
            input = remaining;
        }
        Ok((input, Map(map)))
    }
}

impl<K, V> AmqpEncoder for Map<K, V>
where
    K: Eq + Hash + AmqpEncoder,
    V: PartialEq + AmqpEncoder,
{
    fn encoded_size(&self) -> u32 {
        let content_size = self.content_size();
        content_size + compound_header_size(content_size)
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        write_compound_header(
            writer,
            TypeCode::Map8,
            TypeCode::Map32,
            self.content_size(),
            self.0.len() as u32 * 2,
        )?;
        for (key, value) in &self.0 {
            key.encode(writer)?;
            value.encode(writer)?;
        }
        Ok(())
    }
}
