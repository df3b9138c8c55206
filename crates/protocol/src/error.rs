use common::WireError;

use crate::CommandType;

/// Error returned when decoding a wire frame fails.
///
/// `Incomplete` input is not an error; the frame codec reports it through
/// [`crate::frame::Decoded::Incomplete`] so the caller can buffer more bytes.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The code byte has no registered command type. Recoverable; the
    /// connection layer decides whether to drop the frame or the connection.
    #[error("unknown command code: {0}")]
    UnknownCommandCode(i8),

    /// The declared payload length exceeds the configured maximum frame size.
    #[error("declared frame payload of {length} bytes exceeds the {max} byte maximum")]
    FrameTooLarge { length: usize, max: usize },

    /// The payload decoder consumed fewer bytes than the frame declared.
    #[error("{command:?} payload declared {declared} bytes but decoding consumed {consumed}")]
    LengthMismatch { command: CommandType, declared: usize, consumed: usize },

    /// The payload is interpreted by the append pipeline, not the catalog.
    #[error("{0:?} has no generic decoder; its payload is externally handled")]
    ExternallyHandled(CommandType),

    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Error returned when encoding a command into a wire frame fails.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("payload of {length} bytes exceeds the {max} byte maximum")]
    PayloadTooLarge { length: usize, max: usize },
}

/// Protocol violation observed while reassembling an append session.
///
/// Any of these aborts the session: buffered block and partial-event state is
/// discarded and no partial logical events are delivered.
#[derive(Debug, thiserror::Error)]
pub enum AppendError {
    #[error("append frame received without an active append session")]
    NoActiveSession,

    #[error("writer id mismatch: session {expected:#034x}, frame {actual:#034x}")]
    WriterMismatch { expected: u128, actual: u128 },

    #[error("partial event received but the previous block did not end mid-event")]
    UnexpectedPartialEvent,

    #[error("new append frame received while a partial event is still outstanding")]
    PartialEventPending,

    #[error("block end declared {declared} content bytes but only {buffered} were buffered")]
    BlockTooShort { declared: usize, buffered: usize },

    #[error("block end declared {declared} whole events but {parsed} were reconstructed")]
    EventCountMismatch { declared: u32, parsed: u32 },

    #[error("partial event overran its declared length: expected {declared} bytes, got {received}")]
    PartialEventOverrun { declared: usize, received: usize },
}
