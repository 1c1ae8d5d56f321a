//! Tests for opt-in buffer limits.

use std::num::NonZeroUsize;

use rstest::rstest;

use crate::reassembly::{ReassemblyBuffer, ReassemblyConfig, ReassemblyError};

fn limit(value: usize) -> NonZeroUsize { NonZeroUsize::new(value).expect("non-zero") }

#[test]
fn default_config_is_unbounded() {
    assert_eq!(ReassemblyConfig::default(), ReassemblyConfig::unbounded());
    let mut buffer = ReassemblyBuffer::new();
    for i in 0..64_u64 {
        buffer.ingest(i * 10, [0_u8; 4]).expect("no limit applies");
    }
    assert_eq!(buffer.segment_count(), 64);
}

#[test]
fn byte_limit_rejects_growth_and_leaves_buffer_intact() {
    let config = ReassemblyConfig::default().with_max_buffered_bytes(limit(8));
    let mut buffer = ReassemblyBuffer::with_config(config);
    buffer.ingest(0_u64, b"abcdef").expect("within limit");

    let err = buffer
        .ingest(10_u64, b"xyz")
        .expect_err("growth beyond limit must be rejected");
    assert_eq!(
        err,
        ReassemblyError::BufferLimitExceeded {
            attempted: 9,
            limit: limit(8),
        }
    );
    assert_eq!(buffer.buffered_bytes(), 6);
    assert_eq!(buffer.segment_count(), 1);
}

#[test]
fn overlapping_bytes_do_not_count_twice() {
    let config = ReassemblyConfig::default().with_max_buffered_bytes(limit(5));
    let mut buffer = ReassemblyBuffer::with_config(config);
    buffer.ingest(0_u64, b"Hello").expect("within limit");
    buffer.ingest(0_u64, b"HELLO").expect("retransmission adds nothing");
    buffer.ingest(1_u64, b"ey").expect("overlap adds nothing");
    assert_eq!(buffer.buffered_bytes(), 5);
}

#[test]
fn reading_frees_budget() {
    let config = ReassemblyConfig::default().with_max_buffered_bytes(limit(4));
    let mut buffer = ReassemblyBuffer::with_config(config);
    buffer.ingest(0_u64, b"abcd").expect("within limit");
    assert!(buffer.ingest(4_u64, b"e").is_err());

    let mut out = [0_u8; 2];
    buffer.read(&mut out);
    buffer.ingest(4_u64, b"ef").expect("read released budget");
    assert_eq!(buffer.buffered_bytes(), 4);
}

#[rstest]
#[case::new_disjoint_segment(20, false)]
#[case::bridging_segment(3, true)]
fn segment_limit_counts_merged_result(#[case] offset: u64, #[case] accepted: bool) {
    let config = ReassemblyConfig::default().with_max_segments(limit(2));
    let mut buffer = ReassemblyBuffer::with_config(config);
    buffer.ingest(0_u64, b"abc").expect("first segment");
    buffer.ingest(5_u64, b"fgh").expect("second segment");

    let result = buffer.ingest(offset, b"de");
    assert_eq!(result.is_ok(), accepted);
    if accepted {
        assert_eq!(buffer.segment_count(), 1);
    } else {
        assert!(matches!(
            result,
            Err(ReassemblyError::SegmentLimitExceeded { attempted: 3, .. })
        ));
        assert_eq!(buffer.segment_count(), 2);
    }
}
