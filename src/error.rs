use thiserror::Error;

/// Everything that can go wrong when building or feeding an index. Missing
/// keys are not in here: lookups on absent keys return `None`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("initial capacity must be at least one bucket, got {0}")]
    InvalidCapacity(usize),
    #[error("load factor threshold must be finite and at least 0.1, got {0}")]
    InvalidLoadFactor(f64),
    #[error("key {key:?} is already present")]
    DuplicateKey { key: String },
}
