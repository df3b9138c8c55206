use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{CommandType, error::DecodeError, message::CommandCodec};

use common::WireDecode;

/// Version negotiation, sent by both sides immediately after a connection is
/// established. Each side advertises the highest and lowest protocol versions
/// it can speak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hello {
    pub high_version: i32,
    pub low_version: i32,
}

impl CommandCodec for Hello {
    fn command_type() -> CommandType {
        CommandType::HELLO
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i32(self.high_version);
        dst.put_i32(self.low_version);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let high_version = src.read_i32()?;
        let low_version = src.read_i32()?;
        Ok(Self { high_version, low_version })
    }
}

/// Filler frame used for alignment. The payload carries `length` bytes whose
/// content is ignored on receipt; encoding writes zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Padding {
    pub length: u32,
}

impl CommandCodec for Padding {
    fn command_type() -> CommandType {
        CommandType::PADDING
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_bytes(0, self.length as usize);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let length = src.remaining() as u32;
        src.advance(src.remaining());
        Ok(Self { length })
    }
}

/// Keep-alive, sent in either direction. Carries no payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepAlive;

impl CommandCodec for KeepAlive {
    fn command_type() -> CommandType {
        CommandType::KEEP_ALIVE
    }

    fn encode(&self, _dst: &mut BytesMut) {}

    fn decode(_src: &mut Bytes) -> Result<Self, DecodeError> {
        Ok(Self)
    }
}
