use thiserror::Error;

/// Errors raised by the move-tree engine (`State`/`TreeReplica`).
///
/// These cover only protocol invariant violations (spec: "the algorithm
/// does not define behavior here") — the cycle-guard rejection in `do_op`
/// is *not* an error, it's the algorithm's normal, silent no-op path.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TreeError {
    /// An operation was applied whose timestamp equals the current log
    /// head's timestamp. Per the algorithm, timestamps are required to be
    /// globally unique; receiving a colliding one is a programming error in
    /// the caller (typically: two ticks of the same clock were applied
    /// without observing each other), not a legitimate concurrent edit.
    #[error("operation timestamp collides with existing log head; timestamps must be unique")]
    DuplicateTimestamp,
}
