use std::fmt;

use serde::{Deserialize, Serialize};

/// Address in the program's default address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub u64);

impl Address {
    pub fn offset(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Half-open address range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRange {
    pub start: Address,
    pub end: Address,
}

impl AddressRange {
    pub fn new(start: Address, end: Address) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, addr: Address) -> bool {
        self.start <= addr && addr < self.end
    }

    pub fn intersects(&self, other: &AddressRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Sorted, non-overlapping set of address ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSet {
    ranges: Vec<AddressRange>,
}

impl AddressSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_range(start: Address, end: Address) -> Self {
        let mut set = Self::new();
        set.add_range(start, end);
        set
    }

    /// Add `[start, end)`, merging with touching or overlapping ranges.
    pub fn add_range(&mut self, start: Address, end: Address) {
        let mut new = AddressRange::new(start, end);
        if new.is_empty() {
            return;
        }
        let mut kept = Vec::with_capacity(self.ranges.len() + 1);
        for range in self.ranges.drain(..) {
            if range.end < new.start || new.end < range.start {
                kept.push(range);
            } else {
                new.start = new.start.min(range.start);
                new.end = new.end.max(range.end);
            }
        }
        kept.push(new);
        kept.sort_by_key(|r| r.start);
        self.ranges = kept;
    }

    pub fn ranges(&self) -> &[AddressRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn contains(&self, addr: Address) -> bool {
        self.ranges.iter().any(|r| r.contains(addr))
    }

    pub fn intersects(&self, other: &AddressSet) -> bool {
        self.ranges.iter().any(|a| other.ranges.iter().any(|b| a.intersects(b)))
    }

    /// The part of this set inside `[start, end)`.
    pub fn intersect_range(&self, start: Address, end: Address) -> AddressSet {
        let ranges = self
            .ranges
            .iter()
            .map(|r| AddressRange::new(r.start.max(start), r.end.min(end)))
            .filter(|r| !r.is_empty())
            .collect();
        AddressSet { ranges }
    }

    /// Total number of addresses covered.
    pub fn num_addresses(&self) -> u64 {
        self.ranges.iter().map(|r| r.end.0 - r.start.0).sum()
    }
}
