use crdts::{Actor, CvRDT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A grow-only counter CRDT: each actor owns a monotonic slot, and the
/// counter's value is the sum of all slots. Merging two `GCounter`s takes
/// the per-actor max, which is idempotent, commutative and associative —
/// the three properties a state-based (`CvRDT`) counter needs to
/// converge regardless of merge order or duplicate delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GCounter<A: Actor> {
    slots: BTreeMap<A, u64>,
}

impl<A: Actor> GCounter<A> {
    /// returns a new, zero-valued counter
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    /// increments `actor`'s own slot by `amount`. Each actor must only
    /// ever increment its own slot — incrementing another actor's would
    /// violate the grow-only merge invariant.
    pub fn increment(&mut self, actor: A, amount: u64) {
        let slot = self.slots.entry(actor).or_insert(0);
        *slot = slot.saturating_add(amount);
    }

    /// returns the slot recorded for `actor`, or 0 if none.
    pub fn slot(&self, actor: &A) -> u64 {
        self.slots.get(actor).copied().unwrap_or(0)
    }

    /// returns the total value: the sum of every actor's slot.
    pub fn value(&self) -> u64 {
        self.slots.values().sum()
    }
}

impl<A: Actor> CvRDT for GCounter<A> {
    type Validation = std::convert::Infallible;

    fn validate_merge(&self, _other: &Self) -> Result<(), Self::Validation> {
        Ok(())
    }

    /// merges `other` in place: each actor's slot becomes the max of the
    /// two counters' values for that actor.
    fn merge(&mut self, other: Self) {
        for (actor, count) in other.slots.into_iter() {
            let slot = self.slots.entry(actor).or_insert(0);
            if count > *slot {
                *slot = count;
            }
        }
    }
}
