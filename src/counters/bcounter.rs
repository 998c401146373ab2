use super::error::CounterError;
use super::pncounter::PnCounter;
use crdts::{Actor, CvRDT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A bounded counter CRDT: a `PnCounter` plus a quota-transfer ledger, so
/// that `decrement`/`transfer` can be rejected once a replica has spent
/// its share, while still allowing replicas to redistribute quota to
/// each other without coordination.
///
/// `quota(replica)` is the PN counter's value, plus everything
/// transferred *to* `replica`, minus everything transferred *away from*
/// it. A replica may only decrement (or transfer away) up to its own
/// quota; the rejection is enforced locally, so replicas never need to
/// agree on an approval before the fact — the bound is an invariant of
/// the merged state, not of any single update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BCounter<A: Actor> {
    pn: PnCounter<A>,
    // quota transferred from `.0` to `.1`, merged via per-pair max.
    transfers: BTreeMap<(A, A), u64>,
}

impl<A: Actor> BCounter<A> {
    /// returns a new, zero-valued counter
    pub fn new() -> Self {
        Self {
            pn: PnCounter::new(),
            transfers: BTreeMap::new(),
        }
    }

    fn transferred_away(&self, replica: &A) -> u64 {
        self.transfers
            .iter()
            .filter(|((from, _), _)| from == replica)
            .map(|(_, &amount)| amount)
            .sum()
    }

    fn transferred_in(&self, replica: &A) -> u64 {
        self.transfers
            .iter()
            .filter(|((_, to), _)| to == replica)
            .map(|(_, &amount)| amount)
            .sum()
    }

    /// returns `replica`'s spendable quota: its own net PN-counter slot
    /// (not the global PN value — another replica's increments never
    /// inflate `replica`'s quota), plus quota transferred to it from
    /// other replicas, minus quota it has transferred away.
    pub fn quota(&self, replica: &A) -> i64 {
        self.pn.slot(replica) + self.transferred_in(replica) as i64 - self.transferred_away(replica) as i64
    }

    /// increments `actor`'s own slot by `amount`. Unlike `decrement`,
    /// increments are unconditional — they only ever grow the shared pool.
    pub fn increment(&mut self, actor: A, amount: u64) {
        self.pn.increment(actor, amount);
    }

    /// decrements `replica`'s quota by `amount`, i.e. spends from the
    /// shared pool against `replica`'s own allotment. Rejected (state
    /// unchanged) if `replica`'s quota is less than `amount`.
    pub fn decrement(&mut self, replica: A, amount: u64) -> Result<(), CounterError> {
        if self.quota(&replica) < amount as i64 {
            return Err(CounterError::InsufficientQuota);
        }
        self.pn.decrement(replica, amount);
        Ok(())
    }

    /// Transfers `amount` of quota from `replica` (this call's caller —
    /// always the owning replica, never an arbitrary third party) to
    /// `to`. Rejected (state unchanged) if `replica`'s quota is less than
    /// `amount`.
    pub fn transfer(&mut self, replica: A, to: A, amount: u64) -> Result<(), CounterError> {
        if self.quota(&replica) < amount as i64 {
            return Err(CounterError::InsufficientQuota);
        }
        let slot = self.transfers.entry((replica, to)).or_insert(0);
        *slot += amount;
        Ok(())
    }
}

impl<A: Actor> CvRDT for BCounter<A> {
    type Validation = std::convert::Infallible;

    fn validate_merge(&self, _other: &Self) -> Result<(), Self::Validation> {
        Ok(())
    }

    /// merges `other` in place: the PN half merges as usual, and each
    /// transfer-pair's quota becomes the max of the two counters' values
    /// for that pair.
    fn merge(&mut self, other: Self) {
        self.pn.merge(other.pn);
        for (pair, amount) in other.transfers.into_iter() {
            let slot = self.transfers.entry(pair).or_insert(0);
            if amount > *slot {
                *slot = amount;
            }
        }
    }
}
