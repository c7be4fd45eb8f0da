//! Construction parameters for [`ChainedHashTable`](crate::ChainedHashTable).

use crate::error::IndexError;

/// Number of buckets a table starts with when nothing else is asked for.
pub const DEFAULT_INITIAL_CAPACITY: usize = 10;

/// Entries-per-bucket ratio above which a table doubles its bucket array.
pub const DEFAULT_LOAD_FACTOR_THRESHOLD: f64 = 0.8;

/// Smallest threshold a table accepts. Anything lower would have the first
/// few inserts double the bucket array until it no longer fits in memory.
pub const MIN_LOAD_FACTOR_THRESHOLD: f64 = 0.1;

/// Sizing knobs for a hash table. Build one with the setters and hand it to
/// [`ChainedHashTable::from_config`](crate::ChainedHashTable::from_config).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    /// Initial number of buckets. Must be non-zero.
    pub initial_capacity: usize,

    /// Growth trigger. Must be finite and at least
    /// [`MIN_LOAD_FACTOR_THRESHOLD`].
    pub load_factor_threshold: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor_threshold: DEFAULT_LOAD_FACTOR_THRESHOLD,
        }
    }
}

impl TableConfig {
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_load_factor_threshold(mut self, load_factor_threshold: f64) -> Self {
        self.load_factor_threshold = load_factor_threshold;
        self
    }

    /// Checks that a table could actually be built from this config.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.initial_capacity == 0 {
            return Err(IndexError::InvalidCapacity(self.initial_capacity));
        }

        if !self.load_factor_threshold.is_finite()
            || self.load_factor_threshold < MIN_LOAD_FACTOR_THRESHOLD
        {
            return Err(IndexError::InvalidLoadFactor(self.load_factor_threshold));
        }

        Ok(())
    }
}
