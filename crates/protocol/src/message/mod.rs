//! One module per command family; each command type implements
//! [`CommandCodec`] to keep its own parsing and serialization logic
//! self-contained.

pub mod append;
pub mod attribute;
pub mod handshake;
pub mod segment;
pub mod status;

use bytes::{Bytes, BytesMut};

pub use append::{
    AppendBlock, AppendBlockEnd, AppendSetup, ConditionalAppend, ConditionalCheckFailed,
    DataAppended, Event, PartialEvent, SetupAppend,
};
pub use attribute::{
    GetSegmentAttribute, SegmentAttribute, SegmentAttributeUpdated, UpdateSegmentAttribute,
};
pub use handshake::{Hello, KeepAlive, Padding};
pub use segment::{
    CreateSegment, DeleteSegment, GetStreamSegmentInfo, MergeSegments, ReadSegment, SealSegment,
    SegmentCreated, SegmentDeleted, SegmentPolicyUpdated, SegmentRead, SegmentSealed,
    SegmentTruncated, SegmentsMerged, StreamSegmentInfo, TruncateSegment, UpdateSegmentPolicy,
};
pub use status::{
    AuthTokenCheckFailed, InvalidEventNumber, NoSuchSegment, OperationUnsupported,
    SegmentAlreadyExists, SegmentIsSealed, SegmentIsTruncated, WrongHost,
};

use crate::{CommandType, error::DecodeError};

/// Per-command codec. Each command type implements this trait to keep its
/// own parsing and serialization logic self-contained.
///
/// `decode` must consume exactly the bytes the frame declared; the frame
/// codec treats leftovers as a protocol violation.
pub trait CommandCodec: Sized {
    fn command_type() -> CommandType;
    fn encode(&self, dst: &mut BytesMut);
    fn decode(src: &mut Bytes) -> Result<Self, DecodeError>;
}

/// A decoded, strongly-typed protocol command. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Hello(Hello),
    Padding(Padding),
    PartialEvent(PartialEvent),
    Event(Event),
    SetupAppend(SetupAppend),
    AppendSetup(AppendSetup),
    AppendBlock(AppendBlock),
    AppendBlockEnd(AppendBlockEnd),
    ConditionalAppend(ConditionalAppend),
    DataAppended(DataAppended),
    ConditionalCheckFailed(ConditionalCheckFailed),
    ReadSegment(ReadSegment),
    SegmentRead(SegmentRead),
    GetStreamSegmentInfo(GetStreamSegmentInfo),
    StreamSegmentInfo(StreamSegmentInfo),
    CreateSegment(CreateSegment),
    SegmentCreated(SegmentCreated),
    SealSegment(SealSegment),
    SegmentSealed(SegmentSealed),
    DeleteSegment(DeleteSegment),
    SegmentDeleted(SegmentDeleted),
    UpdateSegmentPolicy(UpdateSegmentPolicy),
    SegmentPolicyUpdated(SegmentPolicyUpdated),
    GetSegmentAttribute(GetSegmentAttribute),
    SegmentAttribute(SegmentAttribute),
    UpdateSegmentAttribute(UpdateSegmentAttribute),
    SegmentAttributeUpdated(SegmentAttributeUpdated),
    TruncateSegment(TruncateSegment),
    SegmentTruncated(SegmentTruncated),
    WrongHost(WrongHost),
    SegmentIsSealed(SegmentIsSealed),
    SegmentAlreadyExists(SegmentAlreadyExists),
    NoSuchSegment(NoSuchSegment),
    InvalidEventNumber(InvalidEventNumber),
    SegmentIsTruncated(SegmentIsTruncated),
    OperationUnsupported(OperationUnsupported),
    MergeSegments(MergeSegments),
    SegmentsMerged(SegmentsMerged),
    AuthTokenCheckFailed(AuthTokenCheckFailed),
    KeepAlive(KeepAlive),
}

impl Command {
    /// The wire type of this command.
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Hello(_) => CommandType::HELLO,
            Command::Padding(_) => CommandType::PADDING,
            Command::PartialEvent(_) => CommandType::PARTIAL_EVENT,
            Command::Event(_) => CommandType::EVENT,
            Command::SetupAppend(_) => CommandType::SETUP_APPEND,
            Command::AppendSetup(_) => CommandType::APPEND_SETUP,
            Command::AppendBlock(_) => CommandType::APPEND_BLOCK,
            Command::AppendBlockEnd(_) => CommandType::APPEND_BLOCK_END,
            Command::ConditionalAppend(_) => CommandType::CONDITIONAL_APPEND,
            Command::DataAppended(_) => CommandType::DATA_APPENDED,
            Command::ConditionalCheckFailed(_) => CommandType::CONDITIONAL_CHECK_FAILED,
            Command::ReadSegment(_) => CommandType::READ_SEGMENT,
            Command::SegmentRead(_) => CommandType::SEGMENT_READ,
            Command::GetStreamSegmentInfo(_) => CommandType::GET_STREAM_SEGMENT_INFO,
            Command::StreamSegmentInfo(_) => CommandType::STREAM_SEGMENT_INFO,
            Command::CreateSegment(_) => CommandType::CREATE_SEGMENT,
            Command::SegmentCreated(_) => CommandType::SEGMENT_CREATED,
            Command::SealSegment(_) => CommandType::SEAL_SEGMENT,
            Command::SegmentSealed(_) => CommandType::SEGMENT_SEALED,
            Command::DeleteSegment(_) => CommandType::DELETE_SEGMENT,
            Command::SegmentDeleted(_) => CommandType::SEGMENT_DELETED,
            Command::UpdateSegmentPolicy(_) => CommandType::UPDATE_SEGMENT_POLICY,
            Command::SegmentPolicyUpdated(_) => CommandType::SEGMENT_POLICY_UPDATED,
            Command::GetSegmentAttribute(_) => CommandType::GET_SEGMENT_ATTRIBUTE,
            Command::SegmentAttribute(_) => CommandType::SEGMENT_ATTRIBUTE,
            Command::UpdateSegmentAttribute(_) => CommandType::UPDATE_SEGMENT_ATTRIBUTE,
            Command::SegmentAttributeUpdated(_) => CommandType::SEGMENT_ATTRIBUTE_UPDATED,
            Command::TruncateSegment(_) => CommandType::TRUNCATE_SEGMENT,
            Command::SegmentTruncated(_) => CommandType::SEGMENT_TRUNCATED,
            Command::WrongHost(_) => CommandType::WRONG_HOST,
            Command::SegmentIsSealed(_) => CommandType::SEGMENT_IS_SEALED,
            Command::SegmentAlreadyExists(_) => CommandType::SEGMENT_ALREADY_EXISTS,
            Command::NoSuchSegment(_) => CommandType::NO_SUCH_SEGMENT,
            Command::InvalidEventNumber(_) => CommandType::INVALID_EVENT_NUMBER,
            Command::SegmentIsTruncated(_) => CommandType::SEGMENT_IS_TRUNCATED,
            Command::OperationUnsupported(_) => CommandType::OPERATION_UNSUPPORTED,
            Command::MergeSegments(_) => CommandType::MERGE_SEGMENTS,
            Command::SegmentsMerged(_) => CommandType::SEGMENTS_MERGED,
            Command::AuthTokenCheckFailed(_) => CommandType::AUTH_TOKEN_CHECK_FAILED,
            Command::KeepAlive(_) => CommandType::KEEP_ALIVE,
        }
    }

    /// Serializes this command's payload (frame header excluded).
    pub(crate) fn encode_payload(&self, dst: &mut BytesMut) {
        match self {
            Command::Hello(c) => c.encode(dst),
            Command::Padding(c) => c.encode(dst),
            Command::PartialEvent(c) => c.encode(dst),
            Command::Event(c) => c.encode(dst),
            Command::SetupAppend(c) => c.encode(dst),
            Command::AppendSetup(c) => c.encode(dst),
            Command::AppendBlock(c) => c.encode(dst),
            Command::AppendBlockEnd(c) => c.encode(dst),
            Command::ConditionalAppend(c) => c.encode(dst),
            Command::DataAppended(c) => c.encode(dst),
            Command::ConditionalCheckFailed(c) => c.encode(dst),
            Command::ReadSegment(c) => c.encode(dst),
            Command::SegmentRead(c) => c.encode(dst),
            Command::GetStreamSegmentInfo(c) => c.encode(dst),
            Command::StreamSegmentInfo(c) => c.encode(dst),
            Command::CreateSegment(c) => c.encode(dst),
            Command::SegmentCreated(c) => c.encode(dst),
            Command::SealSegment(c) => c.encode(dst),
            Command::SegmentSealed(c) => c.encode(dst),
            Command::DeleteSegment(c) => c.encode(dst),
            Command::SegmentDeleted(c) => c.encode(dst),
            Command::UpdateSegmentPolicy(c) => c.encode(dst),
            Command::SegmentPolicyUpdated(c) => c.encode(dst),
            Command::GetSegmentAttribute(c) => c.encode(dst),
            Command::SegmentAttribute(c) => c.encode(dst),
            Command::UpdateSegmentAttribute(c) => c.encode(dst),
            Command::SegmentAttributeUpdated(c) => c.encode(dst),
            Command::TruncateSegment(c) => c.encode(dst),
            Command::SegmentTruncated(c) => c.encode(dst),
            Command::WrongHost(c) => c.encode(dst),
            Command::SegmentIsSealed(c) => c.encode(dst),
            Command::SegmentAlreadyExists(c) => c.encode(dst),
            Command::NoSuchSegment(c) => c.encode(dst),
            Command::InvalidEventNumber(c) => c.encode(dst),
            Command::SegmentIsTruncated(c) => c.encode(dst),
            Command::OperationUnsupported(c) => c.encode(dst),
            Command::MergeSegments(c) => c.encode(dst),
            Command::SegmentsMerged(c) => c.encode(dst),
            Command::AuthTokenCheckFailed(c) => c.encode(dst),
            Command::KeepAlive(c) => c.encode(dst),
        }
    }
}
