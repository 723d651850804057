//! Length-prefixed framing for command traffic
//!
//! Every message travels as:
//! ```text
//! [ 4 bytes: length (u32, big-endian) ][ N bytes: protobuf message ]
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use prost::Message;
use std::marker::PhantomData;
use thiserror::Error;

/// Largest accepted frame body. Command traffic is small.
pub const MAX_FRAME_SIZE: u32 = 64 * 1024;

const PREFIX_LEN: usize = 4;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Message too large: {0} bytes (max: {MAX_FRAME_SIZE})")]
    MessageTooLarge(usize),

    #[error("Invalid message length prefix: {0}")]
    InvalidLength(u32),

    #[error("Protobuf decode error: {0}")]
    DecodeError(#[from] prost::DecodeError),

    #[error("Protobuf encode error: {0}")]
    EncodeError(#[from] prost::EncodeError),
}

/// Encode a message into a new length-prefixed buffer
pub fn encode<M: Message>(message: &M) -> Result<Bytes, CodecError> {
    let mut buf = BytesMut::new();
    encode_into(message, &mut buf)?;
    Ok(buf.freeze())
}

/// Append a length-prefixed message to `buf`
pub fn encode_into<M: Message>(message: &M, buf: &mut BytesMut) -> Result<(), CodecError> {
    let msg_len = message.encoded_len();
    let len = u32::try_from(msg_len)
        .ok()
        .filter(|len| *len <= MAX_FRAME_SIZE)
        .ok_or(CodecError::MessageTooLarge(msg_len))?;

    buf.reserve(PREFIX_LEN + msg_len);
    buf.put_u32(len);
    message.encode(buf)?;
    Ok(())
}

/// Try to take one complete frame off the front of `buf`
///
/// Returns `Ok(None)` and leaves `buf` untouched when the frame is not
/// complete yet.
pub fn decode<M: Message + Default>(buf: &mut BytesMut) -> Result<Option<M>, CodecError> {
    if buf.len() < PREFIX_LEN {
        return Ok(None);
    }

    let msg_len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if msg_len > MAX_FRAME_SIZE {
        return Err(CodecError::InvalidLength(msg_len));
    }

    let total_len = PREFIX_LEN + msg_len as usize;
    if buf.len() < total_len {
        return Ok(None);
    }

    buf.advance(PREFIX_LEN);
    let body = buf.split_to(msg_len as usize);
    Ok(Some(M::decode(body)?))
}

/// Accumulates stream data and yields complete messages
#[derive(Debug)]
pub struct FrameDecoder<M> {
    buffer: BytesMut,
    _message: PhantomData<fn() -> M>,
}

impl<M> Default for FrameDecoder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> FrameDecoder<M> {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            _message: PhantomData,
        }
    }

    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Bytes waiting for the rest of their frame
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

impl<M: Message + Default> FrameDecoder<M> {
    /// Call repeatedly until it returns `Ok(None)` to drain all complete frames
    pub fn decode_next(&mut self) -> Result<Option<M>, CodecError> {
        decode(&mut self.buffer)
    }
}
