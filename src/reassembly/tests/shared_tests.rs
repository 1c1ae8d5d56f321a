//! Tests for the mutex-guarded shared buffer.

use std::{num::NonZeroUsize, thread};

use tracing_test::traced_test;

use crate::reassembly::{ReassemblyConfig, SharedReassemblyBuffer, StreamOffset};

#[test]
fn clones_share_one_stream() {
    let shared = SharedReassemblyBuffer::new();
    let producer = shared.clone();

    producer.ingest(5_u64, b"World").expect("valid chunk");
    assert_eq!(shared.buffered_bytes(), 5);
    assert_eq!(shared.readable_len(), 0);

    producer.ingest(0_u64, b"Hello").expect("valid chunk");
    assert_eq!(&shared.read_bytes(32)[..], b"HelloWorld");
    assert_eq!(producer.cursor(), StreamOffset::new(10));
}

#[test]
fn concurrent_producers_fill_every_gap() {
    let shared = SharedReassemblyBuffer::new();
    let stream: Vec<u8> = (0..=255_u8).cycle().take(4096).collect();

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let producer = shared.clone();
            let stream = stream.clone();
            thread::spawn(move || {
                for (i, chunk) in stream.chunks(64).enumerate().rev() {
                    if i % 4 == worker {
                        producer
                            .ingest((i * 64) as u64, chunk)
                            .expect("valid chunk");
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("producer panicked");
    }

    let mut out = vec![0_u8; stream.len()];
    assert_eq!(shared.read(&mut out), stream.len());
    assert_eq!(out, stream);
    assert_eq!(shared.segment_count(), 0);
}

#[test]
fn with_buffer_exposes_exclusive_access() {
    let shared = SharedReassemblyBuffer::new();
    shared.ingest(0_u64, b"abc").expect("valid chunk");
    let starts: Vec<u64> = shared.with_buffer(|buffer| {
        buffer.segments().map(|s| s.start().get()).collect()
    });
    assert_eq!(starts, vec![0]);
}

#[traced_test]
#[test]
fn rejected_chunk_is_logged() {
    let config =
        ReassemblyConfig::default().with_max_segments(NonZeroUsize::new(1).expect("non-zero"));
    let shared = SharedReassemblyBuffer::with_config(config);
    shared.ingest(0_u64, b"a").expect("first segment");
    assert!(shared.ingest(10_u64, b"b").is_err());

    assert!(logs_contain("chunk rejected"));
}
