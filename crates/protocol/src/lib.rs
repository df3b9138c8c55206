//! Segment-Store Wire Protocol
//!
//! This crate defines every message that crosses the network boundary between
//! stream-storage clients and the segment store, the binary framing used to
//! encode and decode them, and the request/reply pairing that gives the
//! protocol its semantics.
//!
//! Command codes are aligned with the published wire protocol and must never
//! be renumbered: gaps in the numeric space are reserved for future commands
//! and decode as [`error::DecodeError::UnknownCommandCode`].

pub mod assembler;
pub mod catalog;
pub mod error;
pub mod frame;
pub mod message;
pub mod reply;

pub use assembler::AppendAssembler;
pub use catalog::Catalog;
pub use frame::{Decoded, FrameCodec};
pub use message::Command;

/// The types of commands that can be sent over the wire.
///
/// Each carries a stable one-byte code identifying it in the frame header.
/// Negative codes are reserved for protocol-management commands (handshake,
/// padding, partial-event continuation); the positive range is used for
/// segment operations. New commands must preserve this partition.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum CommandType {
    /// Version negotiation, sent by both sides when a connection opens.
    HELLO = -127,
    /// Filler frame; its payload is ignored.
    PADDING = -1,
    /// Remainder of an event truncated at the end of the previous block.
    PARTIAL_EVENT = -2,
    /// A single event. Read by the append pipeline, never generically decoded.
    EVENT = 0,
    /// Establishes an append session for a segment.
    SETUP_APPEND = 1,
    /// Reply to `SETUP_APPEND`, carrying the last acknowledged event number.
    APPEND_SETUP = 2,
    /// Batched raw event bytes, possibly truncating an event mid-block.
    APPEND_BLOCK = 3,
    /// Terminates a block, declaring content size and event count.
    APPEND_BLOCK_END = 4,
    /// Single-event append guarded by an expected segment offset.
    CONDITIONAL_APPEND = 5,
    /// Success reply to an append, carrying the new tail offset.
    DATA_APPENDED = 7,
    /// A conditional append's expected-offset precondition did not hold.
    CONDITIONAL_CHECK_FAILED = 8,
    READ_SEGMENT = 9,
    SEGMENT_READ = 10,
    GET_STREAM_SEGMENT_INFO = 11,
    STREAM_SEGMENT_INFO = 12,
    CREATE_SEGMENT = 20,
    SEGMENT_CREATED = 21,
    SEAL_SEGMENT = 28,
    SEGMENT_SEALED = 29,
    DELETE_SEGMENT = 30,
    SEGMENT_DELETED = 31,
    UPDATE_SEGMENT_POLICY = 32,
    SEGMENT_POLICY_UPDATED = 33,
    GET_SEGMENT_ATTRIBUTE = 34,
    SEGMENT_ATTRIBUTE = 35,
    UPDATE_SEGMENT_ATTRIBUTE = 36,
    SEGMENT_ATTRIBUTE_UPDATED = 37,
    TRUNCATE_SEGMENT = 38,
    SEGMENT_TRUNCATED = 39,
    /// Redirect: the addressed segment is owned by another host.
    WRONG_HOST = 50,
    SEGMENT_IS_SEALED = 51,
    SEGMENT_ALREADY_EXISTS = 52,
    NO_SUCH_SEGMENT = 53,
    INVALID_EVENT_NUMBER = 55,
    SEGMENT_IS_TRUNCATED = 56,
    OPERATION_UNSUPPORTED = 57,
    MERGE_SEGMENTS = 58,
    SEGMENTS_MERGED = 59,
    AUTH_TOKEN_CHECK_FAILED = 60,
    /// Keep-alive, sent in either direction; carries no payload.
    KEEP_ALIVE = 100,
}

impl CommandType {
    /// The one-byte wire code written as the first byte of every frame.
    pub fn code(self) -> i8 {
        self as i8
    }

    /// Looks up the command type for a wire code, if one is assigned.
    pub fn from_code(code: i8) -> Option<Self> {
        Some(match code {
            -127 => Self::HELLO,
            -2 => Self::PARTIAL_EVENT,
            -1 => Self::PADDING,
            0 => Self::EVENT,
            1 => Self::SETUP_APPEND,
            2 => Self::APPEND_SETUP,
            3 => Self::APPEND_BLOCK,
            4 => Self::APPEND_BLOCK_END,
            5 => Self::CONDITIONAL_APPEND,
            7 => Self::DATA_APPENDED,
            8 => Self::CONDITIONAL_CHECK_FAILED,
            9 => Self::READ_SEGMENT,
            10 => Self::SEGMENT_READ,
            11 => Self::GET_STREAM_SEGMENT_INFO,
            12 => Self::STREAM_SEGMENT_INFO,
            20 => Self::CREATE_SEGMENT,
            21 => Self::SEGMENT_CREATED,
            28 => Self::SEAL_SEGMENT,
            29 => Self::SEGMENT_SEALED,
            30 => Self::DELETE_SEGMENT,
            31 => Self::SEGMENT_DELETED,
            32 => Self::UPDATE_SEGMENT_POLICY,
            33 => Self::SEGMENT_POLICY_UPDATED,
            34 => Self::GET_SEGMENT_ATTRIBUTE,
            35 => Self::SEGMENT_ATTRIBUTE,
            36 => Self::UPDATE_SEGMENT_ATTRIBUTE,
            37 => Self::SEGMENT_ATTRIBUTE_UPDATED,
            38 => Self::TRUNCATE_SEGMENT,
            39 => Self::SEGMENT_TRUNCATED,
            50 => Self::WRONG_HOST,
            51 => Self::SEGMENT_IS_SEALED,
            52 => Self::SEGMENT_ALREADY_EXISTS,
            53 => Self::NO_SUCH_SEGMENT,
            55 => Self::INVALID_EVENT_NUMBER,
            56 => Self::SEGMENT_IS_TRUNCATED,
            57 => Self::OPERATION_UNSUPPORTED,
            58 => Self::MERGE_SEGMENTS,
            59 => Self::SEGMENTS_MERGED,
            60 => Self::AUTH_TOKEN_CHECK_FAILED,
            100 => Self::KEEP_ALIVE,
            _ => return None,
        })
    }
}
