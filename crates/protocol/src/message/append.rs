//! Commands forming the append pipeline: session setup, batched blocks,
//! partial-event continuation, and the conditional (optimistic-concurrency)
//! append path.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use common::{WireDecode, WireEncode};

use crate::{CommandType, error::DecodeError, message::CommandCodec};

/// Establishes an append session for a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupAppend {
    pub request_id: i64,
    pub writer_id: u128,
    pub segment: Bytes,
    pub delegation_token: Bytes,
}

impl CommandCodec for SetupAppend {
    fn command_type() -> CommandType {
        CommandType::SETUP_APPEND
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_u128(self.writer_id);
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_length_prefixed_u16(&self.delegation_token);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let writer_id = src.read_u128()?;
        let segment = src.read_length_prefixed_u16()?;
        let delegation_token = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, writer_id, segment, delegation_token })
    }
}

/// Reply to [`SetupAppend`], carrying the last event number the store has
/// acknowledged for this writer. Callers use it for deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendSetup {
    pub request_id: i64,
    pub segment: Bytes,
    pub writer_id: u128,
    pub last_event_number: i64,
}

impl CommandCodec for AppendSetup {
    fn command_type() -> CommandType {
        CommandType::APPEND_SETUP
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_u128(self.writer_id);
        dst.put_i64(self.last_event_number);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        let writer_id = src.read_u128()?;
        let last_event_number = src.read_i64()?;
        Ok(Self { request_id, segment, writer_id, last_event_number })
    }
}

/// Batched raw event bytes. The block alone does not reveal event
/// boundaries; they are recovered when the matching [`AppendBlockEnd`]
/// arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendBlock {
    pub writer_id: u128,
    pub data: Bytes,
}

impl CommandCodec for AppendBlock {
    fn command_type() -> CommandType {
        CommandType::APPEND_BLOCK
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u128(self.writer_id);
        dst.put(self.data.as_ref());
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let writer_id = src.read_u128()?;
        let data = src.copy_to_bytes(src.remaining());
        Ok(Self { writer_id, data })
    }
}

/// Terminates a block, declaring how many bytes of the block were actual
/// event content (versus padding) and how many whole events it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendBlockEnd {
    pub writer_id: u128,
    pub size_of_whole_events: u32,
    pub num_events: u32,
    pub last_event_number: i64,
    pub request_id: i64,
}

impl CommandCodec for AppendBlockEnd {
    fn command_type() -> CommandType {
        CommandType::APPEND_BLOCK_END
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u128(self.writer_id);
        dst.put_u32(self.size_of_whole_events);
        dst.put_u32(self.num_events);
        dst.put_i64(self.last_event_number);
        dst.put_i64(self.request_id);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let writer_id = src.read_u128()?;
        let size_of_whole_events = src.read_u32()?;
        let num_events = src.read_u32()?;
        let last_event_number = src.read_i64()?;
        let request_id = src.read_i64()?;
        Ok(Self { writer_id, size_of_whole_events, num_events, last_event_number, request_id })
    }
}

/// Single-event append applied only if the segment's current length equals
/// `expected_offset` at the time of application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalAppend {
    pub writer_id: u128,
    pub event_number: i64,
    pub expected_offset: i64,
    pub event: Bytes,
}

impl CommandCodec for ConditionalAppend {
    fn command_type() -> CommandType {
        CommandType::CONDITIONAL_APPEND
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u128(self.writer_id);
        dst.put_i64(self.event_number);
        dst.put_i64(self.expected_offset);
        dst.put_length_prefixed_u32(&self.event);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let writer_id = src.read_u128()?;
        let event_number = src.read_i64()?;
        let expected_offset = src.read_i64()?;
        let event = src.read_length_prefixed_u32()?;
        Ok(Self { writer_id, event_number, expected_offset, event })
    }
}

/// Success reply to an append, carrying the segment's new tail offset.
/// For a given segment the tail offset is monotonically increasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataAppended {
    pub writer_id: u128,
    pub event_number: i64,
    pub previous_event_number: i64,
    pub tail_offset: i64,
}

impl CommandCodec for DataAppended {
    fn command_type() -> CommandType {
        CommandType::DATA_APPENDED
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u128(self.writer_id);
        dst.put_i64(self.event_number);
        dst.put_i64(self.previous_event_number);
        dst.put_i64(self.tail_offset);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let writer_id = src.read_u128()?;
        let event_number = src.read_i64()?;
        let previous_event_number = src.read_i64()?;
        let tail_offset = src.read_i64()?;
        Ok(Self { writer_id, event_number, previous_event_number, tail_offset })
    }
}

/// A conditional append's expected-offset precondition did not hold.
/// Callers retry with an updated offset rather than abandon the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalCheckFailed {
    pub writer_id: u128,
    pub event_number: i64,
}

impl CommandCodec for ConditionalCheckFailed {
    fn command_type() -> CommandType {
        CommandType::CONDITIONAL_CHECK_FAILED
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

/// Remainder of an event whose bytes were truncated at the end of the
/// previous block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialEvent {
    pub data: Bytes,
}

impl CommandCodec for PartialEvent {
    fn command_type() -> CommandType {
        CommandType::PARTIAL_EVENT
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put(self.data.as_ref());
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let data = src.copy_to_bytes(src.remaining());
        Ok(Self { data })
    }
}

/// A single event's bytes.
///
/// `EVENT` frames are interpreted directly by the append pipeline, so this
/// type deliberately does not implement [`CommandCodec`]: the catalog
/// registers it with an externally-handled marker instead of a decode
/// routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub data: Bytes,
}

impl Event {
    /// Writes the event as a bare frame payload (raw bytes, no prefix).
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.put(self.data.as_ref());
    }

    /// Writes the event in block-content form: u32 length prefix followed by
    /// the event bytes. This is the encoding parsed back out of append
    /// blocks by the assembler.
    pub fn encode_prefixed(&self, dst: &mut BytesMut) {
        dst.put_length_prefixed_u32(&self.data);
    }
}
