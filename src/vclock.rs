use crdts::Actor;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A vector clock: one counter per actor that has touched the clock.
///
/// Unlike `Clock` (a single Lamport scalar tagged with its owning actor,
/// used internally by the move-tree engine to timestamp operations),
/// `VClock` tracks one counter *per actor* and so can express genuine
/// concurrency: two `VClock`s with neither dominating the other
/// witnessed causally independent events. It is not used by the tree
/// engine itself; it's exposed for callers that want to detect
/// concurrent writes across replicas (e.g. to decide whether two
/// counter updates should be treated as conflicting).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VClock<A: Actor> {
    counters: BTreeMap<A, u64>,
}

impl<A: Actor> VClock<A> {
    /// returns a new, empty vector clock
    pub fn new() -> Self {
        Self {
            counters: BTreeMap::new(),
        }
    }

    /// returns the counter recorded for `actor`, or 0 if none.
    pub fn counter(&self, actor: &A) -> u64 {
        self.counters.get(actor).copied().unwrap_or(0)
    }

    /// increments `actor`'s slot in place and returns the new value.
    pub fn inc(&mut self, actor: A) -> u64 {
        let slot = self.counters.entry(actor).or_insert(0);
        *slot += 1;
        *slot
    }

    /// merges `other` into this clock in place: each actor's slot becomes
    /// the max of the two clocks' values for that actor.
    pub fn merge(&mut self, other: &Self) {
        for (actor, &count) in other.counters.iter() {
            let slot = self.counters.entry(actor.clone()).or_insert(0);
            if count > *slot {
                *slot = count;
            }
        }
    }

    /// Componentwise partial order: `Some(Less)` iff every slot in `self`
    /// is <= the corresponding slot in `other` and at least one is
    /// strictly less (and symmetrically for `Greater`); `Some(Equal)` iff
    /// all slots match; `None` if neither dominates the other (the two
    /// clocks are concurrent).
    pub fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let mut actors: std::collections::BTreeSet<&A> = self.counters.keys().collect();
        actors.extend(other.counters.keys());

        let mut less = false;
        let mut greater = false;
        for actor in actors {
            match self.counter(actor).cmp(&other.counter(actor)) {
                Ordering::Less => less = true,
                Ordering::Greater => greater = true,
                Ordering::Equal => {}
            }
        }

        match (less, greater) {
            (false, false) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (true, true) => None,
        }
    }

    /// returns true iff `self` and `other` are concurrent, i.e. neither
    /// causally dominates the other.
    pub fn concurrent(&self, other: &Self) -> bool {
        self.partial_cmp(other).is_none()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn inc_and_counter_roundtrip() {
        let mut c = VClock::<u8>::new();
        assert_eq!(c.counter(&1), 0);
        assert_eq!(c.inc(1), 1);
        assert_eq!(c.inc(1), 2);
        assert_eq!(c.counter(&1), 2);
        assert_eq!(c.counter(&2), 0);
    }

    #[test]
    fn merge_takes_componentwise_max() {
        let mut a = VClock::<u8>::new();
        a.inc(1);
        a.inc(1);
        let mut b = VClock::<u8>::new();
        b.inc(2);

        a.merge(&b);
        assert_eq!(a.counter(&1), 2);
        assert_eq!(a.counter(&2), 1);
    }

    #[test]
    fn identical_clocks_are_equal_not_concurrent() {
        let mut a = VClock::<u8>::new();
        a.inc(1);
        let b = a.clone();
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Equal));
        assert!(!a.concurrent(&b));
    }

    #[test]
    fn disjoint_updates_are_concurrent() {
        let mut a = VClock::<u8>::new();
        a.inc(1);
        let mut b = VClock::<u8>::new();
        b.inc(2);

        assert_eq!(a.partial_cmp(&b), None);
        assert!(a.concurrent(&b));
    }

    #[test]
    fn strictly_ahead_dominates() {
        let mut a = VClock::<u8>::new();
        a.inc(1);
        let mut b = a.clone();
        b.inc(1);

        assert_eq!(a.partial_cmp(&b), Some(Ordering::Less));
        assert_eq!(b.partial_cmp(&a), Some(Ordering::Greater));
    }
}
