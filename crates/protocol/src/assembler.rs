//! Reassembles logical events from the physical framing of an append
//! session.
//!
//! An append batches many small events into contiguous wire blocks for
//! throughput. Event boundaries are never known from a block alone: each
//! event inside block content is u32-length-prefixed, and only the matching
//! `APPEND_BLOCK_END` (declaring content size and whole-event count)
//! disambiguates content from padding. An event truncated at the end of a
//! block is completed by the `PARTIAL_EVENT` frame that follows the block
//! end.
//!
//! One assembler is owned by one connection's handling context and must
//! never be shared; frames are applied in the order they were decoded.

use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, warn};

use crate::{
    error::AppendError,
    message::{
        AppendBlock, AppendBlockEnd, Command, ConditionalAppend, ConditionalCheckFailed,
        DataAppended, PartialEvent, SetupAppend,
    },
};

const EVENT_LENGTH_PREFIX: usize = 4;

/// Per-connection reassembly state for the append pipeline.
///
/// Any [`AppendError`] aborts the current session: buffered block bytes and
/// partial-event state are discarded with no residual effect, and further
/// append frames fail with [`AppendError::NoActiveSession`] until the next
/// [`AppendAssembler::begin_session`].
#[derive(Default)]
pub struct AppendAssembler {
    session: Option<Session>,
}

struct Session {
    writer_id: u128,
    segment: Bytes,
    /// Raw block bytes accumulated since the last block end.
    block: BytesMut,
    /// The truncated tail of an event (length prefix included), awaiting its
    /// `PARTIAL_EVENT` continuation.
    partial: Option<BytesMut>,
    last_event_number: Option<i64>,
}

impl AppendAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh append session, discarding any previous state.
    pub fn begin_session(&mut self, setup: &SetupAppend) {
        debug!(writer_id = setup.writer_id, "append session started");
        self.session = Some(Session {
            writer_id: setup.writer_id,
            segment: setup.segment.clone(),
            block: BytesMut::new(),
            partial: None,
            last_event_number: None,
        });
    }

    /// Discards all accumulated state for the current session.
    pub fn abort_session(&mut self) {
        if self.session.take().is_some() {
            debug!("append session aborted by caller");
        }
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// The segment the active session appends to.
    pub fn segment(&self) -> Option<&Bytes> {
        self.session.as_ref().map(|session| &session.segment)
    }

    /// The last event number declared by a block end in this session.
    pub fn last_event_number(&self) -> Option<i64> {
        self.session.as_ref().and_then(|session| session.last_event_number)
    }

    /// Buffers a block's raw event bytes.
    pub fn on_block(&mut self, block: &AppendBlock) -> Result<(), AppendError> {
        self.apply(|session| session.apply_block(block))
    }

    /// Closes the current block: separates content from padding, recovers
    /// whole events, and records a truncated tail (if any) for the
    /// `PARTIAL_EVENT` that must follow.
    pub fn on_block_end(&mut self, end: &AppendBlockEnd) -> Result<Vec<Bytes>, AppendError> {
        self.apply(|session| session.apply_block_end(end))
    }

    /// Continues a truncated event. Returns the completed logical event once
    /// the accumulated bytes match its declared length exactly.
    pub fn on_partial_event(
        &mut self,
        partial: &PartialEvent,
    ) -> Result<Option<Bytes>, AppendError> {
        self.apply(|session| session.apply_partial(partial))
    }

    /// Delivers a bare `EVENT` frame (routed here by the frame codec) as one
    /// logical event.
    pub fn on_event(&mut self, data: Bytes) -> Result<Bytes, AppendError> {
        self.apply(|session| session.apply_event(data))
    }

    /// Runs one step against the active session. On violation the session is
    /// dropped so no partial logical events survive.
    fn apply<T>(
        &mut self,
        step: impl FnOnce(&mut Session) -> Result<T, AppendError>,
    ) -> Result<T, AppendError> {
        let mut session = self.session.take().ok_or(AppendError::NoActiveSession)?;
        match step(&mut session) {
            Ok(value) => {
                self.session = Some(session);
                Ok(value)
            }
            Err(violation) => {
                warn!(%violation, "append protocol violation; session aborted");
                Err(violation)
            }
        }
    }
}

impl Session {
    fn check_writer(&self, writer_id: u128) -> Result<(), AppendError> {
        if writer_id != self.writer_id {
            return Err(AppendError::WriterMismatch {
                expected: self.writer_id,
                actual: writer_id,
            });
        }
        Ok(())
    }

    fn apply_block(&mut self, block: &AppendBlock) -> Result<(), AppendError> {
        self.check_writer(block.writer_id)?;
        if self.partial.is_some() {
            return Err(AppendError::PartialEventPending);
        }
        self.block.extend_from_slice(&block.data);
        Ok(())
    }

    fn apply_block_end(&mut self, end: &AppendBlockEnd) -> Result<Vec<Bytes>, AppendError> {
        self.check_writer(end.writer_id)?;
        if self.partial.is_some() {
            return Err(AppendError::PartialEventPending);
        }

        let declared = end.size_of_whole_events as usize;
        if self.block.len() < declared {
            return Err(AppendError::BlockTooShort { declared, buffered: self.block.len() });
        }
        let mut content = self.block.split_to(declared).freeze();
        // Whatever remains of the block buffer is padding.
        self.block.clear();

        let mut events = Vec::with_capacity(end.num_events as usize);
        while content.has_remaining() {
            if content.remaining() < EVENT_LENGTH_PREFIX {
                // The length prefix itself was split across the boundary.
                self.partial = Some(BytesMut::from(&content[..]));
                break;
            }
            let event_len = u32::from_be_bytes([content[0], content[1], content[2], content[3]])
                as usize;
            if content.remaining() < EVENT_LENGTH_PREFIX + event_len {
                self.partial = Some(BytesMut::from(&content[..]));
                break;
            }
            content.advance(EVENT_LENGTH_PREFIX);
            events.push(content.copy_to_bytes(event_len));
        }

        if events.len() != end.num_events as usize {
            return Err(AppendError::EventCountMismatch {
                declared: end.num_events,
                parsed: events.len() as u32,
            });
        }
        self.last_event_number = Some(end.last_event_number);
        Ok(events)
    }

    fn apply_partial(&mut self, partial: &PartialEvent) -> Result<Option<Bytes>, AppendError> {
        let Some(buf) = self.partial.as_mut() else {
            return Err(AppendError::UnexpectedPartialEvent);
        };
        buf.extend_from_slice(&partial.data);

        if buf.len() < EVENT_LENGTH_PREFIX {
            return Ok(None);
        }
        let declared = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        let total = EVENT_LENGTH_PREFIX + declared;
        if buf.len() < total {
            return Ok(None);
        }
        if buf.len() > total {
            return Err(AppendError::PartialEventOverrun {
                declared,
                received: buf.len() - EVENT_LENGTH_PREFIX,
            });
        }

        let mut event = std::mem::take(buf).freeze();
        self.partial = None;
        event.advance(EVENT_LENGTH_PREFIX);
        Ok(Some(event))
    }

    fn apply_event(&mut self, data: Bytes) -> Result<Bytes, AppendError> {
        if self.partial.is_some() {
            return Err(AppendError::PartialEventPending);
        }
        Ok(data)
    }
}

/// The optimistic-concurrency decision for a conditional append.
///
/// The append is applied only if the segment's current logical length equals
/// the caller's expected offset at the time of application; otherwise the
/// reply is [`ConditionalCheckFailed`] so the caller can retry with an
/// updated offset.
pub fn conditional_outcome(current_length: i64, append: &ConditionalAppend) -> Command {
    if current_length == append.expected_offset {
        Command::DataAppended(DataAppended {
            writer_id: append.writer_id,
            event_number: append.event_number,
            previous_event_number: append.event_number - 1,
            tail_offset: current_length + (EVENT_LENGTH_PREFIX + append.event.len()) as i64,
        })
    } else {
        Command::ConditionalCheckFailed(ConditionalCheckFailed {
            writer_id: append.writer_id,
            event_number: append.event_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;

    use super::*;
    use crate::message::Event;

    const WRITER: u128 = 0xAA;

    fn setup() -> SetupAppend {
        SetupAppend {
            request_id: 1,
            writer_id: WRITER,
            segment: Bytes::from_static(b"scope/stream/0"),
            delegation_token: Bytes::new(),
        }
    }

    fn assembler() -> AppendAssembler {
        let mut assembler = AppendAssembler::new();
        assembler.begin_session(&setup());
        assembler
    }

    fn block(data: &[u8]) -> AppendBlock {
        AppendBlock { writer_id: WRITER, data: Bytes::copy_from_slice(data) }
    }

    fn block_end(size_of_whole_events: u32, num_events: u32) -> AppendBlockEnd {
        AppendBlockEnd {
            writer_id: WRITER,
            size_of_whole_events,
            num_events,
            last_event_number: 10,
            request_id: 1,
        }
    }

    fn prefixed(events: &[&[u8]]) -> BytesMut {
        let mut buf = BytesMut::new();
        for event in events {
            Event { data: Bytes::copy_from_slice(event) }.encode_prefixed(&mut buf);
        }
        buf
    }

    #[test]
    fn whole_events_are_recovered_from_one_block() {
        let mut assembler = assembler();
        let content = prefixed(&[b"one", b"two", b"three"]);
        let size = content.len() as u32;

        assembler.on_block(&block(&content)).unwrap();
        let events = assembler.on_block_end(&block_end(size, 3)).unwrap();

        assert_eq!(events, vec![
            Bytes::from_static(b"one"),
            Bytes::from_static(b"two"),
            Bytes::from_static(b"three"),
        ]);
        assert_eq!(assembler.last_event_number(), Some(10));
    }

    #[test]
    fn padding_beyond_declared_content_is_dropped() {
        let mut assembler = assembler();
        let mut data = prefixed(&[b"event"]);
        let size = data.len() as u32;
        data.put_bytes(0, 16); // padding

        assembler.on_block(&block(&data)).unwrap();
        let events = assembler.on_block_end(&block_end(size, 1)).unwrap();
        assert_eq!(events, vec![Bytes::from_static(b"event")]);
    }

    #[test]
    fn truncated_event_is_completed_by_partial_event() {
        let mut assembler = assembler();
        let mut content = prefixed(&[b"first"]);
        // Second event declares 8 bytes but only 3 made it into the block.
        content.put_u32(8);
        content.put(&b"abc"[..]);
        let size = content.len() as u32;

        assembler.on_block(&block(&content)).unwrap();
        let events = assembler.on_block_end(&block_end(size, 1)).unwrap();
        assert_eq!(events, vec![Bytes::from_static(b"first")]);

        let completed = assembler
            .on_partial_event(&PartialEvent { data: Bytes::from_static(b"defgh") })
            .unwrap();
        assert_eq!(completed, Some(Bytes::from_static(b"abcdefgh")));
    }

    #[test]
    fn split_length_prefix_is_reassembled() {
        let mut assembler = assembler();
        // Only two bytes of the next event's length prefix fit the block.
        let content = &[0u8, 0][..];
        assembler.on_block(&block(content)).unwrap();
        assembler.on_block_end(&block_end(2, 0)).unwrap();

        let mut rest = BytesMut::new();
        rest.put_u16(3); // low half of the u32 prefix: total length 3
        rest.put(&b"xyz"[..]);
        let completed =
            assembler.on_partial_event(&PartialEvent { data: rest.freeze() }).unwrap();
        assert_eq!(completed, Some(Bytes::from_static(b"xyz")));
    }

    #[test]
    fn partial_event_may_span_several_frames() {
        let mut assembler = assembler();
        let mut content = BytesMut::new();
        content.put_u32(6);
        content.put(&b"ab"[..]);
        let size = content.len() as u32;
        assembler.on_block(&block(&content)).unwrap();
        assembler.on_block_end(&block_end(size, 0)).unwrap();

        let first = assembler
            .on_partial_event(&PartialEvent { data: Bytes::from_static(b"cd") })
            .unwrap();
        assert_eq!(first, None);
        let second = assembler
            .on_partial_event(&PartialEvent { data: Bytes::from_static(b"ef") })
            .unwrap();
        assert_eq!(second, Some(Bytes::from_static(b"abcdef")));
    }

    #[test]
    fn partial_event_without_truncated_block_is_a_violation() {
        let mut assembler = assembler();
        let err = assembler
            .on_partial_event(&PartialEvent { data: Bytes::from_static(b"stray") })
            .unwrap_err();
        assert!(matches!(err, AppendError::UnexpectedPartialEvent));
        assert!(!assembler.has_session(), "violation must abort the session");
    }

    #[test]
    fn block_while_partial_pending_is_a_violation() {
        let mut assembler = assembler();
        let mut content = BytesMut::new();
        content.put_u32(10);
        content.put(&b"ab"[..]);
        let size = content.len() as u32;
        assembler.on_block(&block(&content)).unwrap();
        assembler.on_block_end(&block_end(size, 0)).unwrap();

        let err = assembler.on_block(&block(b"more")).unwrap_err();
        assert!(matches!(err, AppendError::PartialEventPending));
    }

    #[test]
    fn event_count_mismatch_is_a_violation() {
        let mut assembler = assembler();
        let content = prefixed(&[b"one", b"two"]);
        let size = content.len() as u32;
        assembler.on_block(&block(&content)).unwrap();

        let err = assembler.on_block_end(&block_end(size, 3)).unwrap_err();
        assert!(matches!(err, AppendError::EventCountMismatch { declared: 3, parsed: 2 }));
        assert!(!assembler.has_session());
    }

    #[test]
    fn block_end_declaring_more_content_than_buffered_is_a_violation() {
        let mut assembler = assembler();
        assembler.on_block(&block(b"abc")).unwrap();
        let err = assembler.on_block_end(&block_end(10, 1)).unwrap_err();
        assert!(matches!(err, AppendError::BlockTooShort { declared: 10, buffered: 3 }));
    }

    #[test]
    fn partial_event_overrun_is_a_violation() {
        let mut assembler = assembler();
        let mut content = BytesMut::new();
        content.put_u32(4);
        content.put(&b"ab"[..]);
        let size = content.len() as u32;
        assembler.on_block(&block(&content)).unwrap();
        assembler.on_block_end(&block_end(size, 0)).unwrap();

        let err = assembler
            .on_partial_event(&PartialEvent { data: Bytes::from_static(b"cdef") })
            .unwrap_err();
        assert!(matches!(err, AppendError::PartialEventOverrun { declared: 4, received: 6 }));
    }

    #[test]
    fn writer_mismatch_is_a_violation() {
        let mut assembler = assembler();
        let err = assembler
            .on_block(&AppendBlock { writer_id: 0xBB, data: Bytes::from_static(b"x") })
            .unwrap_err();
        assert!(matches!(
            err,
            AppendError::WriterMismatch { expected: WRITER, actual: 0xBB }
        ));
    }

    #[test]
    fn frames_without_a_session_are_rejected() {
        let mut assembler = AppendAssembler::new();
        assert!(matches!(
            assembler.on_block(&block(b"x")),
            Err(AppendError::NoActiveSession)
        ));
    }

    #[test]
    fn abort_discards_partial_state_without_residue() {
        let mut assembler = assembler();
        let mut content = BytesMut::new();
        content.put_u32(10);
        content.put(&b"ab"[..]);
        let size = content.len() as u32;
        assembler.on_block(&block(&content)).unwrap();
        assembler.on_block_end(&block_end(size, 0)).unwrap();

        assembler.abort_session();
        assert!(!assembler.has_session());

        // A fresh session on the same segment starts clean.
        assembler.begin_session(&setup());
        let content = prefixed(&[b"clean"]);
        let size = content.len() as u32;
        assembler.on_block(&block(&content)).unwrap();
        let events = assembler.on_block_end(&block_end(size, 1)).unwrap();
        assert_eq!(events, vec![Bytes::from_static(b"clean")]);
    }

    #[test]
    fn bare_event_is_delivered_directly() {
        let mut assembler = assembler();
        let event = assembler.on_event(Bytes::from_static(b"single")).unwrap();
        assert_eq!(event, Bytes::from_static(b"single"));
    }

    #[test]
    fn conditional_outcome_succeeds_on_matching_offset() {
        let append = ConditionalAppend {
            writer_id: WRITER,
            event_number: 5,
            expected_offset: 100,
            event: Bytes::from_static(b"abcd"),
        };
        let Command::DataAppended(reply) = conditional_outcome(100, &append) else {
            panic!("expected DataAppended");
        };
        assert_eq!(reply.event_number, 5);
        assert_eq!(reply.tail_offset, 108);
    }

    #[test]
    fn conditional_outcome_fails_on_stale_offset() {
        let append = ConditionalAppend {
            writer_id: WRITER,
            event_number: 5,
            expected_offset: 100,
            event: Bytes::from_static(b"abcd"),
        };
        let Command::ConditionalCheckFailed(reply) = conditional_outcome(108, &append) else {
            panic!("expected ConditionalCheckFailed");
        };
        assert_eq!(reply.writer_id, WRITER);
        assert_eq!(reply.event_number, 5);
    }
}
