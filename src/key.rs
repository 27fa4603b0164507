//! Paint Keys and Program Identities
//!
//! A [`PaintKey`] is the immutable, serialized description of one paint
//! pipeline: a flattened pre-order sequence of `(snippet id, child count)`
//! records whose nesting reconstructs a tree. Keys are produced by an
//! external builder, validated at the interning boundary, and permanently
//! retained by the [`ShaderCodeDictionary`](crate::ShaderCodeDictionary).
//!
//! A [`PaintId`] is the small dense handle assigned to each distinct valid
//! key. Id 0 is reserved as the invalid sentinel.

use std::sync::Arc;

/// One flattened record of a serialized pipeline tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyRecord {
    pub snippet_id: i32,
    pub num_children: u8,
}

impl KeyRecord {
    #[must_use]
    pub const fn new(snippet_id: i32, num_children: u8) -> Self {
        Self {
            snippet_id,
            num_children,
        }
    }

    #[must_use]
    pub const fn leaf(snippet_id: i32) -> Self {
        Self::new(snippet_id, 0)
    }
}

/// Immutable serialized pipeline description.
///
/// Cloning is cheap (shared storage), which is also how a candidate key is
/// detached from its builder and retained by the dictionary: the first clone
/// taken under the dictionary lock owns the records for the life of the
/// process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PaintKey {
    records: Option<Arc<[KeyRecord]>>,
}

impl PaintKey {
    /// Wraps a flattened record sequence. The result may still be malformed;
    /// interning checks [`PaintKey::is_valid`] before assigning an identity.
    #[must_use]
    pub fn new(records: &[KeyRecord]) -> Self {
        Self {
            records: Some(records.into()),
        }
    }

    /// The distinguished invalid sentinel.
    #[must_use]
    pub fn invalid() -> Self {
        Self { records: None }
    }

    /// Returns the record sequence, empty for the invalid sentinel.
    #[must_use]
    pub fn records(&self) -> &[KeyRecord] {
        self.records.as_deref().unwrap_or(&[])
    }

    /// A key is valid when it is non-empty and every record's declared child
    /// count is satisfied by exactly that many well-formed subtrees.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let records = self.records();
        if records.is_empty() {
            return false;
        }
        let mut pos = 0;
        while pos < records.len() {
            match subtree_len(records, pos) {
                Some(len) => pos += len,
                None => return false,
            }
        }
        true
    }

    /// Number of root subtrees, 0 for malformed or invalid keys.
    #[must_use]
    pub fn num_roots(&self) -> usize {
        let records = self.records();
        let mut pos = 0;
        let mut roots = 0;
        while pos < records.len() {
            match subtree_len(records, pos) {
                Some(len) => {
                    pos += len;
                    roots += 1;
                }
                None => return 0,
            }
        }
        roots
    }
}

/// Length in records of the subtree rooted at `start`, or `None` if the
/// sequence is truncated.
pub(crate) fn subtree_len(records: &[KeyRecord], start: usize) -> Option<usize> {
    let rec = records.get(start)?;
    let mut pos = start + 1;
    for _ in 0..rec.num_children {
        pos += subtree_len(records, pos)?;
    }
    Some(pos - start)
}

/// Dense interned handle for a distinct valid [`PaintKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaintId(u32);

impl PaintId {
    /// The reserved invalid identity.
    pub const INVALID: Self = Self(0);

    #[must_use]
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl Default for PaintId {
    fn default() -> Self {
        Self::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_invalid() {
        assert!(!PaintKey::invalid().is_valid());
        assert!(!PaintKey::new(&[]).is_valid());
    }

    #[test]
    fn leaf_key_is_valid() {
        assert!(PaintKey::new(&[KeyRecord::leaf(2)]).is_valid());
    }

    #[test]
    fn child_counts_must_be_satisfied() {
        // Parent declares one child but the sequence ends.
        assert!(!PaintKey::new(&[KeyRecord::new(5, 1)]).is_valid());
        // Parent with one child, properly nested.
        let key = PaintKey::new(&[KeyRecord::new(5, 1), KeyRecord::leaf(2)]);
        assert!(key.is_valid());
        assert_eq!(key.num_roots(), 1);
    }

    #[test]
    fn sibling_roots_are_counted() {
        let key = PaintKey::new(&[
            KeyRecord::leaf(2),
            KeyRecord::new(5, 1),
            KeyRecord::leaf(2),
            KeyRecord::leaf(3),
        ]);
        assert!(key.is_valid());
        assert_eq!(key.num_roots(), 3);
    }

    #[test]
    fn equal_records_compare_equal() {
        let a = PaintKey::new(&[KeyRecord::leaf(2)]);
        let b = PaintKey::new(&[KeyRecord::leaf(2)]);
        assert_eq!(a, b);
    }
}
