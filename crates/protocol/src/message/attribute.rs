//! Segment attribute access: point reads and compare-and-swap updates keyed
//! by a 16-byte attribute identifier.

use bytes::{BufMut, Bytes, BytesMut};

use common::{WireDecode, WireEncode};

use crate::{CommandType, error::DecodeError, message::CommandCodec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSegmentAttribute {
    pub request_id: i64,
    pub segment: Bytes,
    pub attribute_id: u128,
    pub delegation_token: Bytes,
}

impl CommandCodec for GetSegmentAttribute {
    fn command_type() -> CommandType {
        CommandType::GET_SEGMENT_ATTRIBUTE
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_u128(self.attribute_id);
        dst.put_length_prefixed_u16(&self.delegation_token);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        let attribute_id = src.read_u128()?;
        let delegation_token = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, segment, attribute_id, delegation_token })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentAttribute {
    pub request_id: i64,
    pub value: i64,
}

impl CommandCodec for SegmentAttribute {
    fn command_type() -> CommandType {
        CommandType::SEGMENT_ATTRIBUTE
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_i64(self.value);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let value = src.read_i64()?;
        Ok(Self { request_id, value })
    }
}

/// Compare-and-swap on an attribute: applied only if the current value equals
/// `expected_value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSegmentAttribute {
    pub request_id: i64,
    pub segment: Bytes,
    pub attribute_id: u128,
    pub new_value: i64,
    pub expected_value: i64,
    pub delegation_token: Bytes,
}

impl CommandCodec for UpdateSegmentAttribute {
    fn command_type() -> CommandType {
        CommandType::UPDATE_SEGMENT_ATTRIBUTE
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_length_prefixed_u16(&self.segment);
        dst.put_u128(self.attribute_id);
        dst.put_i64(self.new_value);
        dst.put_i64(self.expected_value);
        dst.put_length_prefixed_u16(&self.delegation_token);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let segment = src.read_length_prefixed_u16()?;
        let attribute_id = src.read_u128()?;
        let new_value = src.read_i64()?;
        let expected_value = src.read_i64()?;
        let delegation_token = src.read_length_prefixed_u16()?;
        Ok(Self { request_id, segment, attribute_id, new_value, expected_value, delegation_token })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentAttributeUpdated {
    pub request_id: i64,
    pub success: bool,
}

impl CommandCodec for SegmentAttributeUpdated {
    fn command_type() -> CommandType {
        CommandType::SEGMENT_ATTRIBUTE_UPDATED
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i64(self.request_id);
        dst.put_bool(self.success);
    }

    fn decode(src: &mut Bytes) -> Result<Self, DecodeError> {
        let request_id = src.read_i64()?;
        let success = src.read_bool()?;
        Ok(Self { request_id, success })
    }
}
