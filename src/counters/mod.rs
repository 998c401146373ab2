//! Collaborator counter CRDTs: grow-only, positive-negative, and bounded
//! counters, each keyed by replica/actor id. These are state-based
//! (`CvRDT`) rather than operation-based — unlike the move-tree engine,
//! a counter converges by merging full states, not by replaying a log.

mod bcounter;
mod error;
mod gcounter;
mod pncounter;

pub use self::bcounter::BCounter;
pub use self::error::CounterError;
pub use self::gcounter::GCounter;
pub use self::pncounter::PnCounter;
