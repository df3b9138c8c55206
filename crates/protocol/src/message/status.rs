//! Shared error and status replies. These are ordinary commands with their
//! own codes, not codec-level errors: they cross the wire exactly like
//! success replies and are interpreted through the reply taxonomy.

use bytes::{BufMut, Bytes, BytesMut};

use common::{WireDecode, WireEncode};

use crate::{CommandType, error::DecodeError, message::CommandCodec};

/// Redirect: the addressed segment is owned by `correct_host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrongHost {
    pub request_id: i64,
    pub segment: Bytes,
    pub correct_host: Bytes,
}

impl CommandCodec for WrongHost {
    fn command_type() -> CommandType {
        CommandType::WRONG_HOST
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_length_prefixed_u16(&self.correct_host);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        let correct_host = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, segment, correct_host })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentIsSealed {
    pub request_id: i64,
    pub segment: Bytes,
}

impl CommandCodec for SegmentIsSealed {
    fn command_type() -> CommandType {
        CommandType::SEGMENT_IS_SEALED
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, segment })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentAlreadyExists {
    pub request_id: i64,
    pub segment: Bytes,
}

impl CommandCodec for SegmentAlreadyExists {
    fn command_type() -> CommandType {
        CommandType::SEGMENT_ALREADY_EXISTS
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, segment })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoSuchSegment {
    pub request_id: i64,
    pub segment: Bytes,
}

impl CommandCodec for NoSuchSegment {
    fn command_type() -> CommandType {
        CommandType::NO_SUCH_SEGMENT
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, segment })
    }
}

/// The writer referenced an event number the store cannot accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEventNumber {
    pub writer_id: u128,
    pub event_number: i64,
}

impl CommandCodec for InvalidEventNumber {
    fn command_type() -> CommandType {
        CommandType::INVALID_EVENT_NUMBER
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u128(self.writer_id);
        dst.put_i64(self.event_number);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let writer_id = src.read_u128()?;
        let event_number = src.read_i64()?;
        Ok(Self { writer_id, event_number })
    }
}

/// The requested offset lies below the segment's truncation point, which
/// starts at `start_offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentIsTruncated {
    pub request_id: i64,
    pub segment: Bytes,
    pub start_offset: i64,
}

impl CommandCodec for SegmentIsTruncated {
    fn command_type() -> CommandType {
        CommandType::SEGMENT_IS_TRUNCATED
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_i64(self.start_offset);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        let start_offset = src.read_i64()?;
        Ok(Self { request_id, segment, start_offset })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationUnsupported {
    pub request_id: i64,
    pub operation: Bytes,
}

impl CommandCodec for OperationUnsupported {
    fn command_type() -> CommandType {
        CommandType::OPERATION_UNSUPPORTED
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.operation);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let operation = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, operation })
    }
}

/// The delegation token attached to the request failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokenCheckFailed {
    pub request_id: i64,
}

impl CommandCodec for AuthTokenCheckFailed {
    fn command_type() -> CommandType {
        CommandType::AUTH_TOKEN_CHECK_FAILED
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        Ok(Self { request_id })
    }
}
