//! The request/reply pairing and the shared error vocabulary.
//!
//! Every request command has exactly one canonical success reply; a fixed
//! set of error/status replies can terminate any request. These replies are
//! ordinary commands with their own codes, so they cross the wire uniformly
//! with everything else. This module is passive data used by higher layers
//! for protocol validation.

use crate::CommandType;

/// Error/status replies that may terminate any request.
pub const COMMON_ERROR_REPLIES: [CommandType; 8] = [
    CommandType::WRONG_HOST,
    CommandType::SEGMENT_IS_SEALED,
    CommandType::SEGMENT_ALREADY_EXISTS,
    CommandType::NO_SUCH_SEGMENT,
    CommandType::INVALID_EVENT_NUMBER,
    CommandType::SEGMENT_IS_TRUNCATED,
    CommandType::OPERATION_UNSUPPORTED,
    CommandType::AUTH_TOKEN_CHECK_FAILED,
];

/// The canonical success reply for a request command, or `None` if the
/// command is not a request.
pub fn success_reply(request: CommandType) -> Option<CommandType> {
    use CommandType::*;
    Some(match request {
        HELLO => HELLO,
        SETUP_APPEND => APPEND_SETUP,
        APPEND_BLOCK_END => DATA_APPENDED,
        CONDITIONAL_APPEND => DATA_APPENDED,
        READ_SEGMENT => SEGMENT_READ,
        GET_STREAM_SEGMENT_INFO => STREAM_SEGMENT_INFO,
        CREATE_SEGMENT => SEGMENT_CREATED,
        SEAL_SEGMENT => SEGMENT_SEALED,
        DELETE_SEGMENT => SEGMENT_DELETED,
        UPDATE_SEGMENT_POLICY => SEGMENT_POLICY_UPDATED,
        GET_SEGMENT_ATTRIBUTE => SEGMENT_ATTRIBUTE,
        UPDATE_SEGMENT_ATTRIBUTE => SEGMENT_ATTRIBUTE_UPDATED,
        TRUNCATE_SEGMENT => SEGMENT_TRUNCATED,
        MERGE_SEGMENTS => SEGMENTS_MERGED,
        KEEP_ALIVE => KEEP_ALIVE,
        _ => return None,
    })
}

/// Whether `reply` belongs to the shared error vocabulary.
pub fn is_error_reply(reply: CommandType) -> bool {
    COMMON_ERROR_REPLIES.contains(&reply)
}

/// Whether `reply` is a valid response to `request`.
///
/// True for the request's canonical success reply, for any shared error
/// reply, and for `CONDITIONAL_CHECK_FAILED` in response to
/// `CONDITIONAL_APPEND` (its dedicated failure signal).
pub fn is_valid_reply(request: CommandType, reply: CommandType) -> bool {
    let Some(success) = success_reply(request) else {
        return false;
    };
    if reply == success || is_error_reply(reply) {
        return true;
    }
    request == CommandType::CONDITIONAL_APPEND
        && reply == CommandType::CONDITIONAL_CHECK_FAILED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandType::*;

    #[test]
    fn every_request_has_exactly_one_success_reply() {
        let requests = [
            (HELLO, HELLO),
            (SETUP_APPEND, APPEND_SETUP),
            (APPEND_BLOCK_END, DATA_APPENDED),
            (CONDITIONAL_APPEND, DATA_APPENDED),
            (READ_SEGMENT, SEGMENT_READ),
            (GET_STREAM_SEGMENT_INFO, STREAM_SEGMENT_INFO),
            (CREATE_SEGMENT, SEGMENT_CREATED),
            (SEAL_SEGMENT, SEGMENT_SEALED),
            (DELETE_SEGMENT, SEGMENT_DELETED),
            (UPDATE_SEGMENT_POLICY, SEGMENT_POLICY_UPDATED),
            (GET_SEGMENT_ATTRIBUTE, SEGMENT_ATTRIBUTE),
            (UPDATE_SEGMENT_ATTRIBUTE, SEGMENT_ATTRIBUTE_UPDATED),
            (TRUNCATE_SEGMENT, SEGMENT_TRUNCATED),
            (MERGE_SEGMENTS, SEGMENTS_MERGED),
            (KEEP_ALIVE, KEEP_ALIVE),
        ];
        for (request, reply) in requests {
            assert_eq!(success_reply(request), Some(reply));
            assert!(is_valid_reply(request, reply));
        }
    }

    #[test]
    fn shared_errors_terminate_any_request() {
        for error in COMMON_ERROR_REPLIES {
            assert!(is_valid_reply(CREATE_SEGMENT, error));
            assert!(is_valid_reply(SETUP_APPEND, error));
            assert!(is_valid_reply(READ_SEGMENT, error));
        }
    }

    #[test]
    fn conditional_check_failed_only_answers_conditional_append() {
        assert!(is_valid_reply(CONDITIONAL_APPEND, CONDITIONAL_CHECK_FAILED));
        assert!(!is_valid_reply(APPEND_BLOCK_END, CONDITIONAL_CHECK_FAILED));
        assert!(!is_valid_reply(CREATE_SEGMENT, CONDITIONAL_CHECK_FAILED));
    }

    #[test]
    fn replies_are_not_requests() {
        for reply in [SEGMENT_CREATED, DATA_APPENDED, STREAM_SEGMENT_INFO, WRONG_HOST] {
            assert_eq!(success_reply(reply), None);
            assert!(!is_valid_reply(reply, SEGMENT_CREATED));
        }
    }

    #[test]
    fn mismatched_success_replies_are_invalid() {
        assert!(!is_valid_reply(CREATE_SEGMENT, SEGMENT_SEALED));
        assert!(!is_valid_reply(SEAL_SEGMENT, SEGMENT_CREATED));
    }
}
