//! Lane sets.
//!
//! A lane is just a name. Each stage declares the set of lanes it reads and
//! the set it writes; the pipeline uses these sets to validate wiring and to
//! create and delete lanes in the batch around each stage.

use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;

/// Ordered set of lane names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LaneSet(BTreeSet<String>);

impl LaneSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, lane: impl Into<String>) -> bool {
        self.0.insert(lane.into())
    }

    pub fn remove(&mut self, lane: &str) -> bool {
        self.0.remove(lane)
    }

    pub fn contains(&self, lane: &str) -> bool {
        self.0.contains(lane)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_subset(&self, other: &LaneSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Lanes in `self` that are not in `other`.
    pub fn difference(&self, other: &LaneSet) -> BTreeSet<String> {
        self.0.difference(&other.0).cloned().collect()
    }

    pub fn as_set(&self) -> &BTreeSet<String> {
        &self.0
    }

    pub fn into_set(self) -> BTreeSet<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for LaneSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        LaneSet(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for LaneSet {
    fn from(lanes: [S; N]) -> Self {
        lanes.into_iter().collect()
    }
}

impl From<BTreeSet<String>> for LaneSet {
    fn from(lanes: BTreeSet<String>) -> Self {
        LaneSet(lanes)
    }
}

impl<'a> IntoIterator for &'a LaneSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for LaneSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, lane) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", lane)?;
        }
        write!(f, "]")
    }
}
