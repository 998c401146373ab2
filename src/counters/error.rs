use thiserror::Error;

/// Errors raised by the counter CRDTs.
///
/// Distinct from `TreeError`/`FsError` (the move-tree engine's and
/// filesystem projection's own error types): a counter is a bare `CvRDT`
/// value type with no dependency on the tree, so it gets its own error
/// type rather than reaching into `fs`.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CounterError {
    /// a `BCounter::decrement`/`transfer` was rejected because it would
    /// spend past the replica's spendable quota.
    #[error("insufficient quota for this operation")]
    InsufficientQuota,
}
