//! End-to-end tests: commands → wire frames → catalog dispatch → append
//! reassembly, driven the way a connection handler would.

use bytes::{BufMut, Bytes, BytesMut};

use protocol::assembler::conditional_outcome;
use protocol::error::DecodeError;
use protocol::message::*;
use protocol::{AppendAssembler, Command, Decoded, FrameCodec};

const MAX_FRAME: usize = 1024 * 1024;

fn decode_all(codec: &FrameCodec, src: &mut BytesMut) -> Vec<Decoded> {
    let mut decoded = Vec::new();
    loop {
        match codec.decode(src).unwrap() {
            Decoded::Incomplete => return decoded,
            frame => decoded.push(frame),
        }
    }
}

fn sample_commands() -> Vec<Command> {
    let segment = Bytes::from_static(b"scope/stream/0");
    let token = Bytes::from_static(b"delegation-token");
    vec![
        Command::Hello(Hello { high_version: 9, low_version: 5 }),
        Command::Padding(Padding { length: 12 }),
        Command::PartialEvent(PartialEvent { data: Bytes::from_static(b"tail") }),
        Command::SetupAppend(SetupAppend {
            request_id: 1,
            writer_id: 7,
            segment: segment.clone(),
            delegation_token: token.clone(),
        }),
        Command::AppendSetup(AppendSetup {
            request_id: 1,
            segment: segment.clone(),
            writer_id: 7,
            last_event_number: 41,
        }),
        Command::AppendBlock(AppendBlock { writer_id: 7, data: Bytes::from_static(b"raw") }),
        Command::AppendBlockEnd(AppendBlockEnd {
            writer_id: 7,
            size_of_whole_events: 3,
            num_events: 1,
            last_event_number: 42,
            request_id: 1,
        }),
        Command::ConditionalAppend(ConditionalAppend {
            writer_id: 7,
            event_number: 43,
            expected_offset: 1024,
            event: Bytes::from_static(b"cond"),
        }),
        Command::DataAppended(DataAppended {
            writer_id: 7,
            event_number: 43,
            previous_event_number: 42,
            tail_offset: 1032,
        }),
        Command::ConditionalCheckFailed(ConditionalCheckFailed { writer_id: 7, event_number: 43 }),
        Command::ReadSegment(ReadSegment {
            segment: segment.clone(),
            offset: 0,
            suggested_length: 4096,
            delegation_token: token.clone(),
        }),
        Command::SegmentRead(SegmentRead {
            segment: segment.clone(),
            offset: 0,
            at_tail: false,
            end_of_segment: false,
            data: Bytes::from_static(b"stored"),
        }),
        Command::GetStreamSegmentInfo(GetStreamSegmentInfo {
            request_id: 2,
            segment: segment.clone(),
            delegation_token: token.clone(),
        }),
        Command::StreamSegmentInfo(StreamSegmentInfo {
            request_id: 2,
            segment: segment.clone(),
            exists: true,
            is_sealed: false,
            is_deleted: false,
            last_modified: 1_700_000_000_000,
            write_offset: 2048,
            start_offset: 0,
        }),
        Command::CreateSegment(CreateSegment {
            request_id: 3,
            segment: segment.clone(),
            scale_type: 1,
            target_rate: 100,
            delegation_token: token.clone(),
        }),
        Command::SegmentCreated(SegmentCreated { request_id: 3, segment: segment.clone() }),
        Command::SealSegment(SealSegment {
            request_id: 4,
            segment: segment.clone(),
            delegation_token: token.clone(),
        }),
        Command::SegmentSealed(SegmentSealed { request_id: 4, segment: segment.clone() }),
        Command::DeleteSegment(DeleteSegment {
            request_id: 5,
            segment: segment.clone(),
            delegation_token: token.clone(),
        }),
        Command::SegmentDeleted(SegmentDeleted { request_id: 5, segment: segment.clone() }),
        Command::UpdateSegmentPolicy(UpdateSegmentPolicy {
            request_id: 6,
            segment: segment.clone(),
            scale_type: 0,
            target_rate: 0,
            delegation_token: token.clone(),
        }),
        Command::SegmentPolicyUpdated(SegmentPolicyUpdated {
            request_id: 6,
            segment: segment.clone(),
        }),
        Command::GetSegmentAttribute(GetSegmentAttribute {
            request_id: 7,
            segment: segment.clone(),
            attribute_id: 0x1234,
            delegation_token: token.clone(),
        }),
        Command::SegmentAttribute(SegmentAttribute { request_id: 7, value: -1 }),
        Command::UpdateSegmentAttribute(UpdateSegmentAttribute {
            request_id: 8,
            segment: segment.clone(),
            attribute_id: 0x1234,
            new_value: 10,
            expected_value: 9,
            delegation_token: token.clone(),
        }),
        Command::SegmentAttributeUpdated(SegmentAttributeUpdated {
            request_id: 8,
            success: true,
        }),
        Command::TruncateSegment(TruncateSegment {
            request_id: 9,
            segment: segment.clone(),
            truncation_offset: 512,
            delegation_token: token.clone(),
        }),
        Command::SegmentTruncated(SegmentTruncated { request_id: 9, segment: segment.clone() }),
        Command::WrongHost(WrongHost {
            request_id: 10,
            segment: segment.clone(),
            correct_host: Bytes::from_static(b"host-2:12345"),
        }),
        Command::SegmentIsSealed(SegmentIsSealed { request_id: 11, segment: segment.clone() }),
        Command::SegmentAlreadyExists(SegmentAlreadyExists {
            request_id: 12,
            segment: segment.clone(),
        }),
        Command::NoSuchSegment(NoSuchSegment { request_id: 13, segment: segment.clone() }),
        Command::InvalidEventNumber(InvalidEventNumber { writer_id: 7, event_number: -1 }),
        Command::SegmentIsTruncated(SegmentIsTruncated {
            request_id: 14,
            segment: segment.clone(),
            start_offset: 512,
        }),
        Command::OperationUnsupported(OperationUnsupported {
            request_id: 15,
            operation: Bytes::from_static(b"mergeSegments"),
        }),
        Command::MergeSegments(MergeSegments {
            request_id: 16,
            target: segment.clone(),
            source: Bytes::from_static(b"scope/txn/abc"),
            delegation_token: token.clone(),
        }),
        Command::SegmentsMerged(SegmentsMerged {
            request_id: 16,
            target: segment,
            source: Bytes::from_static(b"scope/txn/abc"),
        }),
        Command::AuthTokenCheckFailed(AuthTokenCheckFailed { request_id: 17 }),
        Command::KeepAlive(KeepAlive),
    ]
}

#[test]
fn every_generic_command_roundtrips_through_the_wire() {
    let codec = FrameCodec::new(MAX_FRAME);
    for original in sample_commands() {
        let wire = codec.encode(&original).unwrap();
        let mut src = BytesMut::from(wire.as_ref());
        let Decoded::Command { command, consumed } = codec.decode(&mut src).unwrap() else {
            panic!("expected a complete command for {original:?}");
        };
        assert_eq!(consumed, wire.len());
        assert_eq!(command, original, "roundtrip mismatch");
    }
}

#[test]
fn a_pipelined_stream_of_frames_decodes_in_order() {
    let codec = FrameCodec::new(MAX_FRAME);
    let commands = sample_commands();
    let mut wire = BytesMut::new();
    for command in &commands {
        wire.put(codec.encode(command).unwrap());
    }

    // Feed the stream one byte at a time; replies must come out in request
    // order with no frame lost or reordered.
    let mut src = BytesMut::new();
    let mut decoded = Vec::new();
    for byte in wire {
        src.put_u8(byte);
        decoded.extend(decode_all(&codec, &mut src));
    }
    assert!(src.is_empty());

    let types: Vec<_> = decoded
        .iter()
        .map(|frame| match frame {
            Decoded::Command { command, .. } => command.command_type(),
            Decoded::Event { .. } => protocol::CommandType::EVENT,
            Decoded::Incomplete => unreachable!(),
        })
        .collect();
    let expected: Vec<_> = commands.iter().map(Command::command_type).collect();
    assert_eq!(types, expected);
}

#[test]
fn append_session_reassembles_events_across_blocks() {
    let codec = FrameCodec::new(MAX_FRAME);
    let mut assembler = AppendAssembler::new();

    // Build the block content: two whole events plus the first half of a
    // third that will be completed by a PARTIAL_EVENT.
    let mut content = BytesMut::new();
    for event in [&b"event-a"[..], &b"event-b"[..]] {
        Event { data: Bytes::copy_from_slice(event) }.encode_prefixed(&mut content);
    }
    content.put_u32(10);
    content.put(&b"split"[..]); // 5 of 10 bytes
    let content_size = content.len() as u32;

    let writer_id = 7;
    let frames = vec![
        Command::SetupAppend(SetupAppend {
            request_id: 1,
            writer_id,
            segment: Bytes::from_static(b"scope/stream/0"),
            delegation_token: Bytes::new(),
        }),
        Command::AppendBlock(AppendBlock { writer_id, data: content.freeze() }),
        Command::AppendBlockEnd(AppendBlockEnd {
            writer_id,
            size_of_whole_events: content_size,
            num_events: 2,
            last_event_number: 2,
            request_id: 1,
        }),
        Command::PartialEvent(PartialEvent { data: Bytes::from_static(b"-tail") }),
    ];

    let mut src = BytesMut::new();
    for frame in &frames {
        src.put(codec.encode(frame).unwrap());
    }

    let mut events = Vec::new();
    for frame in decode_all(&codec, &mut src) {
        match frame {
            Decoded::Command { command: Command::SetupAppend(setup), .. } => {
                assembler.begin_session(&setup);
            }
            Decoded::Command { command: Command::AppendBlock(block), .. } => {
                assembler.on_block(&block).unwrap();
            }
            Decoded::Command { command: Command::AppendBlockEnd(end), .. } => {
                events.extend(assembler.on_block_end(&end).unwrap());
            }
            Decoded::Command { command: Command::PartialEvent(partial), .. } => {
                events.extend(assembler.on_partial_event(&partial).unwrap());
            }
            Decoded::Event { data, .. } => {
                events.push(assembler.on_event(data).unwrap());
            }
            other => panic!("unexpected frame: {:?}", std::mem::discriminant(&other)),
        }
    }

    assert_eq!(events, vec![
        Bytes::from_static(b"event-a"),
        Bytes::from_static(b"event-b"),
        Bytes::from_static(b"split-tail"),
    ]);
    assert_eq!(assembler.last_event_number(), Some(2));
}

#[test]
fn exact_event_count_is_validated_byte_for_byte() {
    let mut assembler = AppendAssembler::new();
    assembler.begin_session(&SetupAppend {
        request_id: 1,
        writer_id: 1,
        segment: Bytes::from_static(b"s"),
        delegation_token: Bytes::new(),
    });

    let mut content = BytesMut::new();
    for event in [&b"one"[..], &b"two"[..], &b"three"[..]] {
        Event { data: Bytes::copy_from_slice(event) }.encode_prefixed(&mut content);
    }
    let size = content.len() as u32;
    assembler
        .on_block(&AppendBlock { writer_id: 1, data: content.freeze() })
        .unwrap();
    let events = assembler
        .on_block_end(&AppendBlockEnd {
            writer_id: 1,
            size_of_whole_events: size,
            num_events: 3,
            last_event_number: 3,
            request_id: 1,
        })
        .unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[2], Bytes::from_static(b"three"));
}

#[test]
fn reserved_code_is_reported_without_crashing() {
    let codec = FrameCodec::new(MAX_FRAME);
    let mut src = BytesMut::new();
    src.put_i8(61);
    src.put_u32(0);
    assert!(matches!(codec.decode(&mut src), Err(DecodeError::UnknownCommandCode(61))));
}

#[test]
fn concurrent_conditional_appends_have_at_most_one_winner() {
    use std::sync::{Arc, Mutex};

    let append = ConditionalAppend {
        writer_id: 7,
        event_number: 1,
        expected_offset: 0,
        event: Bytes::from_static(b"racing"),
    };
    // The segment tail as the storage collaborator would hold it; the check
    // and the length update are applied atomically per append.
    let tail = Arc::new(Mutex::new(0i64));

    let mut handles = Vec::new();
    for _ in 0..2 {
        let tail = Arc::clone(&tail);
        let append = append.clone();
        handles.push(std::thread::spawn(move || {
            let mut tail = tail.lock().unwrap();
            let reply = conditional_outcome(*tail, &append);
            if let Command::DataAppended(ref appended) = reply {
                *tail = appended.tail_offset;
            }
            reply
        }));
    }

    let replies: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
    let wins =
        replies.iter().filter(|reply| matches!(reply, Command::DataAppended(_))).count();
    let failures = replies
        .iter()
        .filter(|reply| matches!(reply, Command::ConditionalCheckFailed(_)))
        .count();
    assert_eq!(wins, 1);
    assert_eq!(failures, 1);
}
