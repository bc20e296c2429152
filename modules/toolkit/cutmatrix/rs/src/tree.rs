use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Origin of the counts stored in a [RegionTree] leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StrandLabel {
    /// Cut points of forward reads (after orienting them to the feature).
    Forward,
    /// Cut points of reverse reads (after orienting them to the feature).
    Reverse,
    /// Cut points of all reads, used when no fragment length bins are configured.
    Both,
}

impl StrandLabel {
    pub fn symbol(&self) -> &'static str {
        match self {
            StrandLabel::Forward => "F",
            StrandLabel::Reverse => "R",
            StrandLabel::Both => "Both",
        }
    }
}

impl Display for StrandLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

type Key = (i64, String, Option<StrandLabel>);

/// Nested view of a [RegionTree]: position -> group key -> strand label -> count.
pub type NestedCounts = BTreeMap<i64, BTreeMap<String, BTreeMap<Option<StrandLabel>, u64>>>;

/// Sparse aggregate of per-base counts around feature centers.
///
/// Leaves are keyed by the position relative to the feature center (negative positions are
/// upstream), the bin group key and the strand label (absent for fragment midpoints). Zero counts are
/// never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionTree {
    counts: BTreeMap<Key, u64>,
}

impl RegionTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn add(&mut self, position: i64, group: &str, strand: Option<StrandLabel>, count: u64) {
        if count == 0 {
            return;
        }
        *self
            .counts
            .entry((position, group.to_owned(), strand))
            .or_default() += count;
    }

    /// Add a per-base track. The middle element of the track is placed at position 0.
    pub fn add_counts(&mut self, group: &str, strand: Option<StrandLabel>, counts: &[u64]) {
        let offset = (counts.len() / 2) as i64;
        for (ind, count) in counts.iter().enumerate() {
            self.add(ind as i64 - offset, group, strand, *count);
        }
    }

    /// Key-wise sum of two trees.
    pub fn merge(&mut self, other: RegionTree) {
        if self.counts.is_empty() {
            self.counts = other.counts;
            return;
        }
        for (key, count) in other.counts {
            match self.counts.entry(key) {
                Entry::Vacant(entry) => {
                    entry.insert(count);
                }
                Entry::Occupied(mut entry) => {
                    *entry.get_mut() += count;
                }
            }
        }
    }

    pub fn get(&self, position: i64, group: &str, strand: Option<StrandLabel>) -> u64 {
        self.counts
            .get(&(position, group.to_owned(), strand))
            .copied()
            .unwrap_or(0)
    }

    /// Leaves ordered by position, group key and strand label.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str, Option<StrandLabel>, u64)> {
        self.counts
            .iter()
            .map(|((position, group, strand), count)| (*position, group.as_str(), *strand, *count))
    }

    /// Sum of all leaves at each position.
    pub fn totals(&self) -> BTreeMap<i64, u64> {
        let mut totals = BTreeMap::new();
        for (position, _, _, count) in self.iter() {
            *totals.entry(position).or_default() += count;
        }
        totals
    }

    pub fn nested(&self) -> NestedCounts {
        let mut nested = NestedCounts::new();
        for (position, group, strand, count) in self.iter() {
            nested
                .entry(position)
                .or_default()
                .entry(group.to_owned())
                .or_default()
                .insert(strand, count);
        }
        nested
    }
}

impl Extend<RegionTree> for RegionTree {
    fn extend<T: IntoIterator<Item = RegionTree>>(&mut self, iter: T) {
        for tree in iter {
            self.merge(tree);
        }
    }
}
