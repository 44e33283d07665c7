use alloc::vec::Vec;

use bincode::{Decode, Encode};

/// Identifier of a label.
pub type Label = u32;

/// Sequence of labels ordered from the most recent one.
///
/// The first element is the label at the current position, the second one is the label one
/// position back, and so on. The length of the sequence is called its order.
///
/// Sequences are ordered lexicographically from the most recent label, and a sequence sorts
/// before all of its extensions.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Decode, Encode)]
pub struct LabelSequence {
    labels: Vec<Label>,
}

impl LabelSequence {
    /// Creates a new label sequence.
    ///
    /// # Arguments
    ///
    /// * `labels` - Labels ordered from the most recent one.
    #[inline(always)]
    #[must_use]
    pub const fn new(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    /// Creates the empty label sequence.
    #[inline(always)]
    #[must_use]
    pub const fn empty() -> Self {
        Self { labels: Vec::new() }
    }

    /// Returns the number of labels.
    #[inline(always)]
    #[must_use]
    pub fn order(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the sequence has no label.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the labels ordered from the most recent one.
    #[inline(always)]
    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Returns the most recent label.
    #[inline(always)]
    #[must_use]
    pub fn first(&self) -> Option<Label> {
        self.labels.first().copied()
    }

    /// Returns the context one position back by removing the most recent label.
    ///
    /// # Panics
    ///
    /// The sequence must not be empty.
    #[must_use]
    pub fn prefix(&self) -> Self {
        assert!(!self.is_empty(), "the empty label sequence has no prefix");
        Self {
            labels: self.labels[1..].to_vec(),
        }
    }

    /// Returns the index of the first label that differs from `other`.
    ///
    /// If one sequence is a leading part of the other, the length of the shorter one is returned.
    #[must_use]
    pub fn difference_position(&self, other: &Self) -> usize {
        self.labels
            .iter()
            .zip(&other.labels)
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| self.order().min(other.order()))
    }
}

impl From<Vec<Label>> for LabelSequence {
    #[inline(always)]
    fn from(labels: Vec<Label>) -> Self {
        Self::new(labels)
    }
}

impl From<&[Label]> for LabelSequence {
    #[inline(always)]
    fn from(labels: &[Label]) -> Self {
        Self::new(labels.to_vec())
    }
}
