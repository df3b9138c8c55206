//! The command catalog: the process-wide, read-only mapping from wire codes
//! to decode routines.
//!
//! The catalog is built once at startup and never mutated afterwards, so
//! lookups need no synchronization. Registering a duplicate or out-of-range
//! code is a construction-time defect and aborts catalog initialization.

use std::sync::OnceLock;

use bytes::Bytes;

use crate::{
    CommandType,
    error::DecodeError,
    message::{self, Command, CommandCodec},
};

/// Inclusive bounds of the one-byte wire code space. `-128` is excluded so
/// every valid code fits the documented [-127, 127] range.
pub const MIN_CODE: i8 = -127;
pub const MAX_CODE: i8 = 127;

const CODE_SPACE: usize = (MAX_CODE as i16 - MIN_CODE as i16 + 1) as usize;

/// A decode routine: payload bytes in, typed command out.
pub type DecodeFn = fn(&mut Bytes) -> Result<Command, DecodeError>;

/// Decode strategy registered for a command type.
pub enum Decoder {
    /// Generic payload decoder invoked through catalog dispatch.
    Generic(DecodeFn),
    /// The payload is interpreted directly by the append pipeline. Only
    /// `EVENT` carries this marker.
    External,
}

struct Entry {
    command: CommandType,
    decoder: Decoder,
}

/// Bijective code → command-type table over the registered subset of
/// [-127, 127].
pub struct Catalog {
    entries: Vec<Option<Entry>>,
}

impl Catalog {
    /// The standard catalog covering every assigned wire command, built on
    /// first use and shared for the life of the process.
    pub fn standard() -> &'static Catalog {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        CATALOG.get_or_init(Catalog::build_standard)
    }

    fn build_standard() -> Catalog {
        use message::*;

        let mut catalog =
            Catalog { entries: std::iter::repeat_with(|| None).take(CODE_SPACE).collect() };

        catalog.register(
            CommandType::HELLO,
            Decoder::Generic(|src| Hello::decode(src).map(Command::Hello)),
        );
        catalog.register(
            CommandType::PADDING,
            Decoder::Generic(|src| Padding::decode(src).map(Command::Padding)),
        );
        catalog.register(
            CommandType::PARTIAL_EVENT,
            Decoder::Generic(|src| PartialEvent::decode(src).map(Command::PartialEvent)),
        );
        // Read manually by the append pipeline.
        catalog.register(CommandType::EVENT, Decoder::External);
        catalog.register(
            CommandType::SETUP_APPEND,
            Decoder::Generic(|src| SetupAppend::decode(src).map(Command::SetupAppend)),
        );
        catalog.register(
            CommandType::APPEND_SETUP,
            Decoder::Generic(|src| AppendSetup::decode(src).map(Command::AppendSetup)),
        );
        catalog.register(
            CommandType::APPEND_BLOCK,
            Decoder::Generic(|src| AppendBlock::decode(src).map(Command::AppendBlock)),
        );
        catalog.register(
            CommandType::APPEND_BLOCK_END,
            Decoder::Generic(|src| AppendBlockEnd::decode(src).map(Command::AppendBlockEnd)),
        );
        catalog.register(
            CommandType::CONDITIONAL_APPEND,
            Decoder::Generic(|src| ConditionalAppend::decode(src).map(Command::ConditionalAppend)),
        );
        catalog.register(
            CommandType::DATA_APPENDED,
            Decoder::Generic(|src| DataAppended::decode(src).map(Command::DataAppended)),
        );
        catalog.register(
            CommandType::CONDITIONAL_CHECK_FAILED,
            Decoder::Generic(|src| {
                ConditionalCheckFailed::decode(src).map(Command::ConditionalCheckFailed)
            }),
        );
        catalog.register(
            CommandType::READ_SEGMENT,
            Decoder::Generic(|src| ReadSegment::decode(src).map(Command::ReadSegment)),
        );
        catalog.register(
            CommandType::SEGMENT_READ,
            Decoder::Generic(|src| SegmentRead::decode(src).map(Command::SegmentRead)),
        );
        catalog.register(
            CommandType::GET_STREAM_SEGMENT_INFO,
            Decoder::Generic(|src| {
                GetStreamSegmentInfo::decode(src).map(Command::GetStreamSegmentInfo)
            }),
        );
        catalog.register(
            CommandType::STREAM_SEGMENT_INFO,
            Decoder::Generic(|src| StreamSegmentInfo::decode(src).map(Command::StreamSegmentInfo)),
        );
        catalog.register(
            CommandType::CREATE_SEGMENT,
            Decoder::Generic(|src| CreateSegment::decode(src).map(Command::CreateSegment)),
        );
        catalog.register(
            CommandType::SEGMENT_CREATED,
            Decoder::Generic(|src| SegmentCreated::decode(src).map(Command::SegmentCreated)),
        );
        catalog.register(
            CommandType::SEAL_SEGMENT,
            Decoder::Generic(|src| SealSegment::decode(src).map(Command::SealSegment)),
        );
        catalog.register(
            CommandType::SEGMENT_SEALED,
            Decoder::Generic(|src| SegmentSealed::decode(src).map(Command::SegmentSealed)),
        );
        catalog.register(
            CommandType::DELETE_SEGMENT,
            Decoder::Generic(|src| DeleteSegment::decode(src).map(Command::DeleteSegment)),
        );
        catalog.register(
            CommandType::SEGMENT_DELETED,
            Decoder::Generic(|src| SegmentDeleted::decode(src).map(Command::SegmentDeleted)),
        );
        catalog.register(
            CommandType::UPDATE_SEGMENT_POLICY,
            Decoder::Generic(|src| {
                UpdateSegmentPolicy::decode(src).map(Command::UpdateSegmentPolicy)
            }),
        );
        catalog.register(
            CommandType::SEGMENT_POLICY_UPDATED,
            Decoder::Generic(|src| {
                SegmentPolicyUpdated::decode(src).map(Command::SegmentPolicyUpdated)
            }),
        );
        catalog.register(
            CommandType::GET_SEGMENT_ATTRIBUTE,
            Decoder::Generic(|src| {
                GetSegmentAttribute::decode(src).map(Command::GetSegmentAttribute)
            }),
        );
        catalog.register(
            CommandType::SEGMENT_ATTRIBUTE,
            Decoder::Generic(|src| SegmentAttribute::decode(src).map(Command::SegmentAttribute)),
        );
        catalog.register(
            CommandType::UPDATE_SEGMENT_ATTRIBUTE,
            Decoder::Generic(|src| {
                UpdateSegmentAttribute::decode(src).map(Command::UpdateSegmentAttribute)
            }),
        );
        catalog.register(
            CommandType::SEGMENT_ATTRIBUTE_UPDATED,
            Decoder::Generic(|src| {
                SegmentAttributeUpdated::decode(src).map(Command::SegmentAttributeUpdated)
            }),
        );
        catalog.register(
            CommandType::TRUNCATE_SEGMENT,
            Decoder::Generic(|src| TruncateSegment::decode(src).map(Command::TruncateSegment)),
        );
        catalog.register(
            CommandType::SEGMENT_TRUNCATED,
            Decoder::Generic(|src| SegmentTruncated::decode(src).map(Command::SegmentTruncated)),
        );
        catalog.register(
            CommandType::WRONG_HOST,
            Decoder::Generic(|src| WrongHost::decode(src).map(Command::WrongHost)),
        );
        catalog.register(
            CommandType::SEGMENT_IS_SEALED,
            Decoder::Generic(|src| SegmentIsSealed::decode(src).map(Command::SegmentIsSealed)),
        );
        catalog.register(
            CommandType::SEGMENT_ALREADY_EXISTS,
            Decoder::Generic(|src| {
                SegmentAlreadyExists::decode(src).map(Command::SegmentAlreadyExists)
            }),
        );
        catalog.register(
            CommandType::NO_SUCH_SEGMENT,
            Decoder::Generic(|src| NoSuchSegment::decode(src).map(Command::NoSuchSegment)),
        );
        catalog.register(
            CommandType::INVALID_EVENT_NUMBER,
            Decoder::Generic(|src| InvalidEventNumber::decode(src).map(Command::InvalidEventNumber)),
        );
        catalog.register(
            CommandType::SEGMENT_IS_TRUNCATED,
            Decoder::Generic(|src| SegmentIsTruncated::decode(src).map(Command::SegmentIsTruncated)),
        );
        catalog.register(
            CommandType::OPERATION_UNSUPPORTED,
            Decoder::Generic(|src| {
                OperationUnsupported::decode(src).map(Command::OperationUnsupported)
            }),
        );
        catalog.register(
            CommandType::MERGE_SEGMENTS,
            Decoder::Generic(|src| MergeSegments::decode(src).map(Command::MergeSegments)),
        );
        catalog.register(
            CommandType::SEGMENTS_MERGED,
            Decoder::Generic(|src| SegmentsMerged::decode(src).map(Command::SegmentsMerged)),
        );
        catalog.register(
            CommandType::AUTH_TOKEN_CHECK_FAILED,
            Decoder::Generic(|src| {
                AuthTokenCheckFailed::decode(src).map(Command::AuthTokenCheckFailed)
            }),
        );
        catalog.register(
            CommandType::KEEP_ALIVE,
            Decoder::Generic(|src| KeepAlive::decode(src).map(Command::KeepAlive)),
        );

        catalog
    }

    fn slot(code: i8) -> usize {
        (code as i16 - MIN_CODE as i16) as usize
    }

    /// Registers a decode routine under the command's code. Panics on a
    /// duplicate or out-of-range code: both are programming defects, not
    /// runtime input errors.
    fn register(&mut self, command: CommandType, decoder: Decoder) {
        let code = command.code();
        if code < MIN_CODE {
            panic!("command code {code} outside the valid [-127, 127] range");
        }
        let slot = Self::slot(code);
        if self.entries[slot].is_some() {
            panic!("duplicate registration for command code {code}");
        }
        self.entries[slot] = Some(Entry { command, decoder });
    }

    /// Looks up the command type registered for a wire code.
    pub fn lookup_by_code(&self, code: i8) -> Option<CommandType> {
        if code < MIN_CODE {
            return None;
        }
        self.entries[Self::slot(code)].as_ref().map(|entry| entry.command)
    }

    /// The decode strategy registered for a wire code.
    pub fn decoder(&self, code: i8) -> Option<&Decoder> {
        if code < MIN_CODE {
            return None;
        }
        self.entries[Self::slot(code)].as_ref().map(|entry| &entry.decoder)
    }

    /// Decodes a payload through the routine registered for `code`.
    ///
    /// Externally-handled commands (`EVENT`) yield a typed
    /// [`DecodeError::ExternallyHandled`] signal; the frame codec checks the
    /// decode strategy first and routes those payloads to the append
    /// pipeline instead.
    pub fn decode(&self, code: i8, payload: &mut Bytes) -> Result<Command, DecodeError> {
        if code < MIN_CODE {
            return Err(DecodeError::UnknownCommandCode(code));
        }
        match self.entries[Self::slot(code)].as_ref() {
            None => Err(DecodeError::UnknownCommandCode(code)),
            Some(Entry { command, decoder: Decoder::External }) => {
                Err(DecodeError::ExternallyHandled(*command))
            }
            Some(Entry { decoder: Decoder::Generic(decode), .. }) => decode(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut, BytesMut};

    use super::*;

    #[test]
    fn all_assigned_codes_are_registered() {
        let catalog = Catalog::standard();
        for code in MIN_CODE..=MAX_CODE {
            assert_eq!(catalog.lookup_by_code(code), CommandType::from_code(code));
        }
    }

    #[test]
    fn lookup_is_stable_across_calls() {
        let catalog = Catalog::standard();
        for _ in 0..3 {
            assert_eq!(catalog.lookup_by_code(20), Some(CommandType::CREATE_SEGMENT));
            assert_eq!(catalog.lookup_by_code(-127), Some(CommandType::HELLO));
            assert_eq!(catalog.lookup_by_code(61), None);
        }
    }

    #[test]
    fn event_is_externally_handled() {
        let catalog = Catalog::standard();
        assert!(matches!(catalog.decoder(0), Some(Decoder::External)));
        let mut payload = Bytes::from_static(b"raw");
        assert!(matches!(
            catalog.decode(0, &mut payload),
            Err(DecodeError::ExternallyHandled(CommandType::EVENT))
        ));
    }

    #[test]
    fn unknown_code_is_reported_not_panicked() {
        let catalog = Catalog::standard();
        let mut payload = Bytes::new();
        assert!(matches!(
            catalog.decode(61, &mut payload),
            Err(DecodeError::UnknownCommandCode(61))
        ));
    }

    #[test]
    fn generic_decode_dispatches_to_the_right_command() {
        let catalog = Catalog::standard();
        let mut buf = BytesMut::new();
        buf.put_i32(9);
        buf.put_i32(5);
        let mut payload = buf.freeze();
        let command = catalog.decode(-127, &mut payload).unwrap();
        assert_eq!(
            command,
            Command::Hello(crate::message::Hello { high_version: 9, low_version: 5 })
        );
    }

    #[test]
    #[should_panic(expected = "duplicate registration")]
    fn duplicate_registration_aborts_construction() {
        let mut catalog =
            Catalog { entries: std::iter::repeat_with(|| None).take(CODE_SPACE).collect() };
        catalog.register(CommandType::KEEP_ALIVE, Decoder::External);
        catalog.register(CommandType::KEEP_ALIVE, Decoder::External);
    }
}
