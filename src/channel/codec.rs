use bytes::{Buf, BufMut, BytesMut};
use interop_shims_protocol::{
    codec::Encoder,
    message::Message,
};
use tokio_util::codec::{Decoder as TokioDecoder, Encoder as TokioEncoder};

use crate::error::ShimError;

const LENGTH_PREFIX: usize = 4;

/// Frames an AMQP message as `[u32 length][encoded message]`
#[derive(Debug, Default)]
pub(crate) struct FrameCodec {}

impl TokioDecoder for FrameCodec {
    type Item = Message;
    type Error = ShimError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Message>, ShimError> {
        if buf.len() < LENGTH_PREFIX {
            return Ok(None);
        }
        let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        if buf.len() < LENGTH_PREFIX + len {
            buf.reserve(LENGTH_PREFIX + len - buf.len());
            return Ok(None);
        }

        buf.advance(LENGTH_PREFIX);
        let frame = buf.split_to(len);
        Ok(Some(Message::from_bytes(&frame)?))
    }
}

impl TokioEncoder<Message> for FrameCodec {
    type Error = ShimError;

    fn encode(&mut self, message: Message, buf: &mut BytesMut) -> Result<(), ShimError> {
        let len = message.encoded_size();
        buf.reserve(LENGTH_PREFIX + len as usize);
        buf.put_u32(len);
        let mut writer = buf.writer();
        message.encode(&mut writer)?;

        Ok(())
    }
}
