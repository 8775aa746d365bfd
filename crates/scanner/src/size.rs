use dirlens_priority_cache::CachePriority;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// File count and byte total of a subtree.
///
/// Ordering is lexicographic on `(file_count, byte_total)`, which is also the
/// eviction priority in the size cache.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FolderSize {
    pub file_count: u64,
    pub byte_total: u64,
}

impl FolderSize {
    pub const ZERO: FolderSize = FolderSize {
        file_count: 0,
        byte_total: 0,
    };

    pub fn new(file_count: u64, byte_total: u64) -> Self {
        Self {
            file_count,
            byte_total,
        }
    }

    pub fn single_file(len: u64) -> Self {
        Self::new(1, len)
    }
}

impl Add for FolderSize {
    type Output = FolderSize;

    fn add(self, rhs: FolderSize) -> FolderSize {
        FolderSize {
            file_count: self.file_count.saturating_add(rhs.file_count),
            byte_total: self.byte_total.saturating_add(rhs.byte_total),
        }
    }
}

impl AddAssign for FolderSize {
    fn add_assign(&mut self, rhs: FolderSize) {
        *self = *self + rhs;
    }
}

impl CachePriority for FolderSize {
    type Priority = FolderSize;

    fn priority(&self) -> FolderSize {
        *self
    }
}
