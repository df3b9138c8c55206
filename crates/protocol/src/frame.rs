//! The frame codec: encodes commands into self-delimiting wire frames and
//! decodes buffered bytes back into commands via catalog dispatch.
//!
//! Wire layout, big-endian:
//! - Byte 0: command code (i8, [-127, 127])
//! - Bytes 1–4: payload length (u32)
//! - Bytes 5..: payload, exactly `length` bytes
//!
//! The codec is stateless and never blocks: decode returns a complete
//! command, reports [`Decoded::Incomplete`] so the caller can buffer more
//! input, or fails with a terminal [`DecodeError`].

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::{trace, warn};

use crate::{
    catalog::{Catalog, Decoder},
    error::{DecodeError, EncodeError},
    message::Command,
};

/// Bytes in the frame header: one code byte plus a four-byte length.
pub const FRAME_HEADER_LEN: usize = 5;

/// Outcome of a decode attempt.
pub enum Decoded {
    /// A complete command, with the total bytes consumed from the input.
    Command { command: Command, consumed: usize },
    /// An `EVENT` frame. Its payload bypasses generic dispatch; the caller
    /// hands it to the connection's append assembler.
    Event { data: Bytes, consumed: usize },
    /// Not enough buffered bytes for a full frame. Nothing was consumed;
    /// retry once more input arrives.
    Incomplete,
}

/// Encodes and decodes wire frames. Stateless and read-only after
/// construction, so one instance may be shared across connections.
pub struct FrameCodec {
    catalog: &'static Catalog,
    max_frame_size: usize,
}

impl FrameCodec {
    /// `max_frame_size` bounds payload length in both directions and comes
    /// from transport policy.
    pub fn new(max_frame_size: usize) -> Self {
        Self { catalog: Catalog::standard(), max_frame_size }
    }

    /// Serializes a command into a complete wire frame.
    pub fn encode(&self, command: &Command) -> Result<Bytes, EncodeError> {
        let mut payload = BytesMut::new();
        command.encode_payload(&mut payload);
        if payload.len() > self.max_frame_size {
            return Err(EncodeError::PayloadTooLarge {
                length: payload.len(),
                max: self.max_frame_size,
            });
        }
        let mut wire = BytesMut::with_capacity(FRAME_HEADER_LEN + payload.len());
        wire.put_i8(command.command_type().code());
        wire.put_u32(payload.len() as u32);
        wire.unsplit(payload);
        Ok(wire.freeze())
    }

    /// Attempts to decode one frame from the front of `src`.
    ///
    /// On success the frame's bytes are consumed from `src`; on
    /// [`Decoded::Incomplete`] the buffer is left untouched. Errors are
    /// reported as values and never consume input, leaving connection
    /// policy (drop frame vs. close) to the caller.
    pub fn decode(&self, src: &mut BytesMut) -> Result<Decoded, DecodeError> {
        if src.len() < FRAME_HEADER_LEN {
            return Ok(Decoded::Incomplete);
        }
        let code = src[0] as i8;
        let length =
            u32::from_be_bytes([src[1], src[2], src[3], src[4]]) as usize;
        if length > self.max_frame_size {
            warn!(code, length, max = self.max_frame_size, "oversized frame declared");
            return Err(DecodeError::FrameTooLarge { length, max: self.max_frame_size });
        }
        // Validate the code before waiting for the payload so a garbage
        // header fails immediately instead of stalling the connection.
        let Some(command_type) = self.catalog.lookup_by_code(code) else {
            warn!(code, "unknown command code");
            return Err(DecodeError::UnknownCommandCode(code));
        };
        if src.len() < FRAME_HEADER_LEN + length {
            return Ok(Decoded::Incomplete);
        }

        src.advance(FRAME_HEADER_LEN);
        let mut payload = src.split_to(length).freeze();
        let consumed = FRAME_HEADER_LEN + length;

        if let Some(Decoder::External) = self.catalog.decoder(code) {
            trace!(?command_type, length, "frame routed to append pipeline");
            return Ok(Decoded::Event { data: payload, consumed });
        }

        let command = self.catalog.decode(code, &mut payload)?;
        if payload.has_remaining() {
            let mismatch = DecodeError::LengthMismatch {
                command: command_type,
                declared: length,
                consumed: length - payload.remaining(),
            };
            warn!(%mismatch, "frame length mismatch");
            return Err(mismatch);
        }
        trace!(?command_type, length, "frame decoded");
        Ok(Decoded::Command { command, consumed })
    }
}
