//! Per-tag watermarks for cache invalidation.
//!
//! Every revalidation advances a process-wide sequence and stamps it on the
//! revalidated tags. A computation records the watermarks of its tags before
//! it starts; if any of them moved by the time it finishes, its result is
//! stale and must not be stored.
//!
//! Marks only matter while some snapshot may still be compared against them,
//! so the cache drops them whenever no computation is in flight.

use super::tags::CacheTag;
use std::collections::HashMap;

/// A point in the revalidation history of one tag.
///
/// Watermarks are monotonically increasing. A tag that was never revalidated
/// sits at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Watermark {
    /// Sequence number of the last revalidation that touched the tag.
    pub sequence: u64,
}

impl Watermark {
    pub fn new(sequence: u64) -> Self {
        Self { sequence }
    }

    /// Create a zero watermark (never revalidated).
    pub fn zero() -> Self {
        Self { sequence: 0 }
    }

    /// Check if this watermark is newer than another.
    pub fn is_newer_than(&self, other: &Watermark) -> bool {
        self.sequence > other.sequence
    }
}

/// Watermarks of a set of tags captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatermarkSnapshot {
    marks: Vec<(CacheTag, Watermark)>,
}

impl WatermarkSnapshot {
    pub fn tags(&self) -> impl Iterator<Item = &CacheTag> {
        self.marks.iter().map(|(tag, _)| tag)
    }
}

/// Current watermark of every tag revalidated since the last prune.
#[derive(Debug, Default)]
pub struct TagWatermarks {
    sequence: u64,
    marks: HashMap<CacheTag, Watermark>,
}

impl TagWatermarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current watermark of a tag.
    pub fn current(&self, tag: &CacheTag) -> Watermark {
        self.marks.get(tag).copied().unwrap_or_default()
    }

    /// Highest sequence handed out so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Advance the watermark of a tag, returning the new value.
    pub fn advance(&mut self, tag: &CacheTag) -> Watermark {
        self.sequence += 1;
        let mark = Watermark::new(self.sequence);
        self.marks.insert(tag.clone(), mark);
        mark
    }

    /// Number of tags carrying a non-zero mark.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Forget every mark. The sequence keeps counting, so marks handed out
    /// later are still newer than any snapshot taken before the prune.
    ///
    /// Only sound while no snapshot is waiting on [`Self::unchanged_since`].
    pub fn prune(&mut self) {
        self.marks.clear();
    }

    /// Capture the current watermarks of `tags`.
    pub fn snapshot(&self, tags: &[CacheTag]) -> WatermarkSnapshot {
        WatermarkSnapshot {
            marks: tags
                .iter()
                .map(|tag| (tag.clone(), self.current(tag)))
                .collect(),
        }
    }

    /// True if no tag in the snapshot has been revalidated since it was taken.
    pub fn unchanged_since(&self, snapshot: &WatermarkSnapshot) -> bool {
        snapshot
            .marks
            .iter()
            .all(|(tag, mark)| !self.current(tag).is_newer_than(mark))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tags::TagScope;
    use uuid::Uuid;

    #[test]
    fn test_unrevalidated_tag_is_zero() {
        let watermarks = TagWatermarks::new();
        let tag = TagScope::Team.by_id(Uuid::now_v7());
        assert_eq!(watermarks.current(&tag), Watermark::zero());
    }

    #[test]
    fn test_advance_is_monotonic_across_tags() {
        let mut watermarks = TagWatermarks::new();
        let a = TagScope::Team.by_id(Uuid::now_v7());
        let b = TagScope::Environment.by_id(Uuid::now_v7());

        let first = watermarks.advance(&a);
        let second = watermarks.advance(&b);
        let third = watermarks.advance(&a);

        assert!(second.is_newer_than(&first));
        assert!(third.is_newer_than(&second));
        assert_eq!(watermarks.current(&a), third);
        assert_eq!(watermarks.sequence(), 3);
    }

    #[test]
    fn test_snapshot_detects_revalidation() {
        let mut watermarks = TagWatermarks::new();
        let a = TagScope::Team.by_id(Uuid::now_v7());
        let b = TagScope::Team.by_user_id(Uuid::now_v7());
        let unrelated = TagScope::Product.by_id(Uuid::now_v7());

        let snapshot = watermarks.snapshot(&[a.clone(), b.clone()]);
        assert!(watermarks.unchanged_since(&snapshot));

        watermarks.advance(&unrelated);
        assert!(watermarks.unchanged_since(&snapshot));

        watermarks.advance(&b);
        assert!(!watermarks.unchanged_since(&snapshot));
        assert_eq!(snapshot.tags().count(), 2);
    }

    #[test]
    fn test_prune_keeps_sequence_moving() {
        let mut watermarks = TagWatermarks::new();
        let tag = TagScope::Team.by_id(Uuid::now_v7());

        let before = watermarks.advance(&tag);
        let stored = watermarks.snapshot(&[tag.clone()]);
        watermarks.prune();
        assert!(watermarks.is_empty());
        assert_eq!(watermarks.current(&tag), Watermark::zero());
        assert!(watermarks.unchanged_since(&stored));

        let after = watermarks.advance(&tag);
        assert!(after.is_newer_than(&before));
        assert!(!watermarks.unchanged_since(&stored));
    }
}
