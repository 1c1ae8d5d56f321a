//! Ordered store of non-overlapping segments.
//!
//! [`SegmentIndex`] keeps segments keyed by their start offset and maximally
//! merged: any two stored segments are separated by at least one missing
//! byte. Inserting is split into a read-only [`MergePlan`] and an apply step
//! so callers can vet the outcome (for example against memory caps) before
//! anything changes.

use std::{
    collections::BTreeMap,
    ops::Bound::{Excluded, Included, Unbounded},
};

use log::trace;

use super::Segment;

/// Segments keyed by start offset, pairwise separated by gaps.
#[derive(Clone, Debug, Default)]
pub struct SegmentIndex {
    segments: BTreeMap<u64, Segment>,
    buffered: usize,
}

/// Result of looking up which stored segments an incoming one would absorb.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergePlan {
    absorbed: Vec<u64>,
    absorbed_bytes: usize,
    start: u64,
    end: u64,
}

impl MergePlan {
    /// Number of stored segments the merge removes.
    #[must_use]
    pub fn absorbed_segments(&self) -> usize { self.absorbed.len() }

    /// Bytes held by the segments the merge removes.
    #[must_use]
    pub const fn absorbed_bytes(&self) -> usize { self.absorbed_bytes }

    /// Length of the segment the merge produces.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "span is the union of in-memory buffers"
    )]
    pub const fn merged_len(&self) -> usize { (self.end - self.start) as usize }
}

/// Summary of an applied merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Number of stored segments folded into the new one.
    pub absorbed_segments: usize,
    /// Incoming bytes that landed on offsets already buffered.
    pub overlap_bytes: usize,
    /// Growth of the buffered byte total.
    pub added_bytes: usize,
}

impl SegmentIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Number of stored segments.
    #[must_use]
    pub fn len(&self) -> usize { self.segments.len() }

    /// Whether no segments are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.segments.is_empty() }

    /// Total bytes held across all segments.
    #[must_use]
    pub const fn buffered_bytes(&self) -> usize { self.buffered }

    /// Iterate stored segments in offset order.
    pub fn iter(&self) -> impl Iterator<Item = &Segment> { self.segments.values() }

    /// Segment with the greatest start at or before `offset`.
    #[must_use]
    pub fn floor(&self, offset: u64) -> Option<&Segment> {
        self.segments.range(..=offset).next_back().map(|(_, s)| s)
    }

    /// Segment with the smallest start at or after `offset`.
    #[must_use]
    pub fn ceiling(&self, offset: u64) -> Option<&Segment> {
        self.segments.range(offset..).next().map(|(_, s)| s)
    }

    /// Segment whose range contains `offset`, if any.
    #[must_use]
    pub fn covering(&self, offset: u64) -> Option<&Segment> {
        self.floor(offset)
            .filter(|segment| offset < segment.end_raw())
    }

    /// Iterate the run of back-to-back segments beginning with the one that
    /// covers `offset`.
    ///
    /// Yields nothing when `offset` sits in a gap.
    pub fn contiguous_from(&self, offset: u64) -> impl Iterator<Item = &Segment> {
        let mut expected: Option<u64> = None;
        self.covering(offset)
            .into_iter()
            .flat_map(move |first| self.segments.range(first.start_raw()..).map(|(_, s)| s))
            .take_while(move |segment| {
                let joined = expected.is_none_or(|next| segment.start_raw() == next);
                expected = Some(segment.end_raw());
                joined
            })
    }

    /// Work out which stored segments `incoming` overlaps or touches.
    ///
    /// The lower neighbour joins when it reaches `incoming.start`; each
    /// following segment joins while it starts at or before the growing end
    /// of the working range.
    #[must_use]
    pub fn plan_merge(&self, incoming: &Segment) -> MergePlan {
        let mut start = incoming.start_raw();
        let mut end = incoming.end_raw();
        let mut absorbed = Vec::new();
        let mut absorbed_bytes = 0;

        let floor = self
            .floor(start)
            .filter(|floor| floor.end_raw() >= incoming.start_raw());
        let lower = match floor {
            Some(floor) => {
                start = floor.start_raw();
                end = end.max(floor.end_raw());
                absorbed.push(floor.start_raw());
                absorbed_bytes += floor.len();
                Excluded(floor.start_raw())
            }
            None => Included(incoming.start_raw()),
        };

        for (&key, segment) in self.segments.range((lower, Unbounded)) {
            if key > end {
                break;
            }
            end = end.max(segment.end_raw());
            absorbed.push(key);
            absorbed_bytes += segment.len();
        }

        MergePlan {
            absorbed,
            absorbed_bytes,
            start,
            end,
        }
    }

    /// Apply a plan produced by [`plan_merge`](Self::plan_merge) for the same
    /// `incoming` segment with no intervening mutation.
    pub fn apply(&mut self, plan: MergePlan, incoming: Segment) -> MergeOutcome {
        let absorbed: Vec<Segment> = plan
            .absorbed
            .iter()
            .filter_map(|key| self.segments.remove(key))
            .collect();
        let overlap_bytes = (plan.absorbed_bytes + incoming.len()).saturating_sub(plan.merged_len());
        let merged = if plan.start == incoming.start_raw() && plan.end == incoming.end_raw() {
            incoming
        } else {
            Segment::compose(plan.start, plan.end, &absorbed, &incoming)
        };
        trace!(
            "merged segment [{}, {}) absorbing {} stored segment(s)",
            plan.start,
            plan.end,
            absorbed.len()
        );

        let added_bytes = merged.len() - plan.absorbed_bytes;
        self.buffered = self.buffered - plan.absorbed_bytes + merged.len();
        self.segments.insert(plan.start, merged);
        MergeOutcome {
            absorbed_segments: absorbed.len(),
            overlap_bytes,
            added_bytes,
        }
    }

    /// Insert `incoming`, merging it with every segment it overlaps or
    /// touches. Bytes from `incoming` win wherever ranges overlap.
    pub fn merge_insert(&mut self, incoming: Segment) -> MergeOutcome {
        let plan = self.plan_merge(&incoming);
        self.apply(plan, incoming)
    }

    /// Remove every byte below `cursor`.
    ///
    /// Segments ending at or before `cursor` are dropped and a segment
    /// straddling it is replaced by its suffix starting at `cursor`. Returns
    /// the number of bytes released.
    pub fn trim_below(&mut self, cursor: u64) -> usize {
        let stale: Vec<u64> = self.segments.range(..cursor).map(|(&key, _)| key).collect();
        let mut released = 0;
        for key in stale {
            let Some(segment) = self.segments.remove(&key) else {
                continue;
            };
            let before = segment.len();
            match segment.clip_below(cursor) {
                Some(suffix) => {
                    released += before - suffix.len();
                    self.segments.insert(cursor, suffix);
                }
                None => released += before,
            }
        }
        self.buffered -= released;
        released
    }
}
