use super::gcounter::GCounter;
use crdts::{Actor, CvRDT};
use serde::{Deserialize, Serialize};

/// A positive-negative counter CRDT: two `GCounter`s, one tracking
/// increments and one tracking decrements, whose difference is the
/// counter's value. Built from two grow-only counters rather than a
/// single mutable integer so that merge stays a pure per-actor max and
/// the result is independent of merge order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PnCounter<A: Actor> {
    p: GCounter<A>,
    n: GCounter<A>,
}

impl<A: Actor> PnCounter<A> {
    /// returns a new, zero-valued counter
    pub fn new() -> Self {
        Self {
            p: GCounter::new(),
            n: GCounter::new(),
        }
    }

    /// increments `actor`'s own positive slot by `amount`.
    pub fn increment(&mut self, actor: A, amount: u64) {
        self.p.increment(actor, amount);
    }

    /// increments `actor`'s own negative slot by `amount` — i.e.
    /// decrements the counter's value by `amount`.
    pub fn decrement(&mut self, actor: A, amount: u64) {
        self.n.increment(actor, amount);
    }

    /// returns the counter's current value: total increments minus total
    /// decrements, as a signed integer (the value can go negative).
    pub fn value(&self) -> i64 {
        self.p.value() as i64 - self.n.value() as i64
    }

    /// returns `actor`'s own net contribution: its increments minus its
    /// decrements. Unlike `value`, which sums every actor's slots, this
    /// is scoped to a single actor's share of the counter.
    pub fn slot(&self, actor: &A) -> i64 {
        self.p.slot(actor) as i64 - self.n.slot(actor) as i64
    }
}

impl<A: Actor> CvRDT for PnCounter<A> {
    type Validation = std::convert::Infallible;

    fn validate_merge(&self, _other: &Self) -> Result<(), Self::Validation> {
        Ok(())
    }

    /// merges `other` in place by merging the positive and negative
    /// halves independently.
    fn merge(&mut self, other: Self) {
        self.p.merge(other.p);
        self.n.merge(other.n);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn increment_and_decrement_combine() {
        let mut c = PnCounter::<u8>::new();
        c.increment(1, 10);
        c.decrement(1, 4);
        c.increment(2, 1);
        assert_eq!(c.value(), 7);
    }

    #[test]
    fn value_can_go_negative() {
        let mut c = PnCounter::<u8>::new();
        c.decrement(1, 5);
        assert_eq!(c.value(), -5);
    }

    #[test]
    fn merge_is_commutative() {
        let mut a = PnCounter::<u8>::new();
        a.increment(1, 3);
        a.decrement(1, 1);
        let mut b = PnCounter::<u8>::new();
        b.increment(2, 2);

        let mut ab = a.clone();
        ab.merge(b.clone());
        let mut ba = b.clone();
        ba.merge(a.clone());
        assert_eq!(ab, ba);
        assert_eq!(ab.value(), 4);
    }
}
