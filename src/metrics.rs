//! Metric helpers for `stream_reassembly`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. Without the
//! `metrics` feature every helper compiles to a no-op.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the counter tracking bytes offered to `ingest`.
pub const BYTES_INGESTED: &str = "reassembly_bytes_ingested_total";
/// Name of the counter tracking bytes handed to readers.
pub const BYTES_DELIVERED: &str = "reassembly_bytes_delivered_total";
/// Name of the counter tracking ingested bytes that were already buffered or
/// delivered.
pub const OVERLAP_BYTES: &str = "reassembly_overlap_bytes_total";
/// Name of the counter tracking rejected chunks.
pub const INGEST_REJECTIONS: &str = "reassembly_ingest_rejections_total";
/// Name of the gauge tracking buffered but unread bytes.
pub const BUFFERED_BYTES: &str = "reassembly_buffered_bytes";

/// Record an accepted chunk of `len` bytes, `overlap` of which were
/// redundant and `added` of which grew the buffer.
pub fn record_ingest(len: usize, overlap: usize, added: usize) {
    #[cfg(feature = "metrics")]
    {
        counter!(BYTES_INGESTED).increment(len as u64);
        if overlap > 0 {
            counter!(OVERLAP_BYTES).increment(overlap as u64);
        }
        if added > 0 {
            gauge!(BUFFERED_BYTES).increment(added as f64);
        }
    }
    #[cfg(not(feature = "metrics"))]
    let _ = (len, overlap, added);
}

/// Record bytes handed to a reader.
pub fn record_delivery(len: usize) {
    #[cfg(feature = "metrics")]
    {
        counter!(BYTES_DELIVERED).increment(len as u64);
        gauge!(BUFFERED_BYTES).decrement(len as f64);
    }
    #[cfg(not(feature = "metrics"))]
    let _ = len;
}

/// Release bytes still buffered when a buffer is dropped.
pub fn release_buffered(len: usize) {
    #[cfg(feature = "metrics")]
    if len > 0 {
        gauge!(BUFFERED_BYTES).decrement(len as f64);
    }
    #[cfg(not(feature = "metrics"))]
    let _ = len;
}

/// Record a rejected chunk labelled by `reason`.
pub fn inc_rejections(reason: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(INGEST_REJECTIONS, "reason" => reason).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = reason;
}
