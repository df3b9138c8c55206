//! Segment lifecycle commands: reads, creation, sealing, deletion, policy
//! updates, truncation, and merges, each with its paired success reply.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use common::{WireDecode, WireEncode};

use crate::{CommandType, error::DecodeError, message::CommandCodec};

/// Requests up to `suggested_length` bytes from a segment at `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadSegment {
    pub segment: Bytes,
    pub offset: i64,
    pub suggested_length: u32,
    pub delegation_token: Bytes,
}

impl CommandCodec for ReadSegment {
    fn command_type() -> CommandType {
        CommandType::READ_SEGMENT
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_i64(self.offset);
        dst.put_u32(self.suggested_length);
        dst.put_length_prefixed_u16(&self.delegation_token);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let segment = src.read_length_prefixed_u16()?;
        let offset = src.read_i64()?;
        let suggested_length = src.read_u32()?;
        let delegation_token = src.read_length_prefixed_u16()?;
        Ok(Self { segment, offset, suggested_length, delegation_token })
    }
}

/// Reply to [`ReadSegment`]. `data` is the raw segment bytes starting at
/// `offset`; the two flags tell the reader whether it has caught up with the
/// writer and whether the segment has ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRead {
    pub segment: Bytes,
    pub offset: i64,
    pub at_tail: bool,
    pub end_of_segment: bool,
    pub data: Bytes,
}

impl CommandCodec for SegmentRead {
    fn command_type() -> CommandType {
        CommandType::SEGMENT_READ
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_i64(self.offset);
        dst.put_bool(self.at_tail);
        dst.put_bool(self.end_of_segment);
        dst.put(self.data.as_ref());
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let segment = src.read_length_prefixed_u16()?;
        let offset = src.read_i64()?;
        let at_tail = src.read_bool()?;
        let end_of_segment = src.read_bool()?;
        let data = src.copy_to_bytes(src.remaining());
        Ok(Self { segment, offset, at_tail, end_of_segment, data })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetStreamSegmentInfo {
    pub request_id: i64,
    pub segment: Bytes,
    pub delegation_token: Bytes,
}

impl CommandCodec for GetStreamSegmentInfo {
    fn command_type() -> CommandType {
        CommandType::GET_STREAM_SEGMENT_INFO
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_length_prefixed_u16(&self.delegation_token);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        let delegation_token = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, segment, delegation_token })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSegmentInfo {
    pub request_id: i64,
    pub segment: Bytes,
    pub exists: bool,
    pub is_sealed: bool,
    pub is_deleted: bool,
    pub last_modified: i64,
    pub write_offset: i64,
    pub start_offset: i64,
}

impl CommandCodec for StreamSegmentInfo {
    fn command_type() -> CommandType {
        CommandType::STREAM_SEGMENT_INFO
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_bool(self.exists);
        dst.put_bool(self.is_sealed);
        dst.put_bool(self.is_deleted);
        dst.put_i64(self.last_modified);
        dst.put_i64(self.write_offset);
        dst.put_i64(self.start_offset);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        let exists = src.read_bool()?;
        let is_sealed = src.read_bool()?;
        let is_deleted = src.read_bool()?;
        let last_modified = src.read_i64()?;
        let write_offset = src.read_i64()?;
        let start_offset = src.read_i64()?;
        Ok(Self {
            request_id,
            segment,
            exists,
            is_sealed,
            is_deleted,
            last_modified,
            write_offset,
            start_offset,
        })
    }
}

/// Creates a segment with the given scaling policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSegment {
    pub request_id: i64,
    pub segment: Bytes,
    pub scale_type: u8,
    pub target_rate: u32,
    pub delegation_token: Bytes,
}

impl CommandCodec for CreateSegment {
    fn command_type() -> CommandType {
        CommandType::CREATE_SEGMENT
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_u8(self.scale_type);
        dst.put_u32(self.target_rate);
        dst.put_length_prefixed_u16(&self.delegation_token);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        let scale_type = src.read_u8()?;
        let target_rate = src.read_u32()?;
        let delegation_token = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, segment, scale_type, target_rate, delegation_token })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentCreated {
    pub request_id: i64,
    pub segment: Bytes,
}

impl CommandCodec for SegmentCreated {
    fn command_type() -> CommandType {
        CommandType::SEGMENT_CREATED
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

/// Seals a segment, permanently preventing further appends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealSegment {
    pub request_id: i64,
    pub segment: Bytes,
    pub delegation_token: Bytes,
}

impl CommandCodec for SealSegment {
    fn command_type() -> CommandType {
        CommandType::SEAL_SEGMENT
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_length_prefixed_u16(&self.delegation_token);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        let delegation_token = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, segment, delegation_token })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSealed {
    pub request_id: i64,
    pub segment: Bytes,
}

impl CommandCodec for SegmentSealed {
    fn command_type() -> CommandType {
        CommandType::SEGMENT_SEALED
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
pub struct DeleteSegment {
    pub request_id: i64,
    pub segment: Bytes,
    pub delegation_token: Bytes,
}

impl CommandCodec for DeleteSegment {
    fn command_type() -> CommandType {
        CommandType::DELETE_SEGMENT
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_length_prefixed_u16(&self.delegation_token);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        let delegation_token = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, segment, delegation_token })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentDeleted {
    pub request_id: i64,
    pub segment: Bytes,
}

impl CommandCodec for SegmentDeleted {
    fn command_type() -> CommandType {
        CommandType::SEGMENT_DELETED
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
pub struct UpdateSegmentPolicy {
    pub request_id: i64,
    pub segment: Bytes,
    pub scale_type: u8,
    pub target_rate: u32,
    pub delegation_token: Bytes,
}

impl CommandCodec for UpdateSegmentPolicy {
    fn command_type() -> CommandType {
        CommandType::UPDATE_SEGMENT_POLICY
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_u8(self.scale_type);
        dst.put_u32(self.target_rate);
        dst.put_length_prefixed_u16(&self.delegation_token);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        let scale_type = src.read_u8()?;
        let target_rate = src.read_u32()?;
        let delegation_token = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, segment, scale_type, target_rate, delegation_token })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPolicyUpdated {
    pub request_id: i64,
    pub segment: Bytes,
}

impl CommandCodec for SegmentPolicyUpdated {
    fn command_type() -> CommandType {
        CommandType::SEGMENT_POLICY_UPDATED
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

/// Discards all segment data below `truncation_offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncateSegment {
    pub request_id: i64,
    pub segment: Bytes,
    pub truncation_offset: i64,
    pub delegation_token: Bytes,
}

impl CommandCodec for TruncateSegment {
    fn command_type() -> CommandType {
        CommandType::TRUNCATE_SEGMENT
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_i64(self.truncation_offset);
        dst.put_length_prefixed_u16(&self.delegation_token);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        let truncation_offset = src.read_i64()?;
        let delegation_token = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, segment, truncation_offset, delegation_token })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTruncated {
    pub request_id: i64,
    pub segment: Bytes,
}

impl CommandCodec for SegmentTruncated {
    fn command_type() -> CommandType {
        CommandType::SEGMENT_TRUNCATED
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

/// Merges `source` into `target`, after which `source` no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSegments {
    pub request_id: i64,
    pub target: Bytes,
    pub source: Bytes,
    pub delegation_token: Bytes,
}

impl CommandCodec for MergeSegments {
    fn command_type() -> CommandType {
        CommandType::MERGE_SEGMENTS
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.target);
        dst.put_length_prefixed_u16(&self.source);
        dst.put_length_prefixed_u16(&self.delegation_token);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let target = src.read_length_prefixed_u16()?;
        let source = src.read_length_prefixed_u16()?;
        let delegation_token = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, target, source, delegation_token })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentsMerged {
    pub request_id: i64,
    pub target: Bytes,
    pub source: Bytes,
}

impl CommandCodec for SegmentsMerged {
    fn command_type() -> CommandType {
        CommandType::SEGMENTS_MERGED
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.target);
        dst.put_length_prefixed_u16(&self.source);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let target = src.read_length_prefixed_u16()?;
        let source = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, target, source })
    }
}
