use serde::{Deserialize, Serialize};
use std::cmp::{Eq, PartialEq};

use super::{Clock, LogOpMove, OpMove, State, Tree, TreeError, TreeId, TreeMeta};
use crdts::Actor;
use log::debug;
use std::collections::{HashMap, HashSet};

/// `TreeReplica` holds a tree `State` plus a Lamport clock (actor + counter)
/// and the bookkeeping needed to compute the causally stable threshold for
/// log truncation.
///
/// `State` is the lower-level, actor-agnostic interface to the tree CRDT;
/// `TreeReplica` is the higher-level interface tied to a particular
/// actor/peer that an application typically drives directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeReplica<ID: TreeId, TM: TreeMeta, A: Actor> {
    state: State<ID, TM, A>, // Tree state
    time: Clock<A>,          // Lamport clock for this replica.

    /// The set of peer actor ids this replica is willing to track for
    /// causal-stability purposes. An actor not in this set never
    /// contributes (and cannot poison) the stability threshold.
    known_peers: HashSet<A>,
    latest_time_by_replica: HashMap<A, Clock<A>>,
}

impl<ID: TreeId, TM: TreeMeta, A: Actor + std::fmt::Debug> TreeReplica<ID, TM, A> {
    /// returns a new, empty TreeReplica identified by `id`
    pub fn new(id: A) -> Self {
        Self {
            state: State::new(),
            time: Clock::<A>::new(id, None),
            known_peers: HashSet::new(),
            latest_time_by_replica: HashMap::new(),
        }
    }

    /// registers `peer` as a known peer whose timestamps count toward the
    /// causally stable threshold.
    pub fn add_peer(&mut self, peer: A) {
        self.known_peers.insert(peer);
    }

    /// removes `peer` from the known-peer set. Its previously recorded
    /// latest timestamp (if any) is also forgotten, since it no longer
    /// constrains the stability threshold.
    pub fn remove_peer(&mut self, peer: &A) {
        self.known_peers.remove(peer);
        self.latest_time_by_replica.remove(peer);
    }

    /// returns the set of known peers.
    pub fn known_peers(&self) -> &HashSet<A> {
        &self.known_peers
    }

    /// Generates an `OpMove` timestamped one tick ahead of this replica's
    /// current clock.
    ///
    /// Note that `OpMove::timestamp` is derived from `TreeReplica::time`
    /// without mutating it — `time` only advances once `apply_op` is
    /// called. Therefore multiple ops generated via this method before
    /// applying any of them would share the same timestamp, and only one
    /// could be successfully applied. To generate several ops at once, use
    /// `opmoves` instead.
    pub fn opmove(&self, parent_id: ID, metadata: TM, child_id: ID) -> OpMove<ID, TM, A> {
        OpMove::new(self.time.inc(), parent_id, metadata, child_id)
    }

    /// Generates a batch of `OpMove`s from `(parent_id, metadata, child_id)`
    /// tuples, each timestamped strictly after the previous one, so the
    /// whole batch can be applied via `apply_ops` without timestamp
    /// collisions.
    pub fn opmoves(&self, ops: Vec<(ID, TM, ID)>) -> Vec<OpMove<ID, TM, A>> {
        let mut time = self.time.clone();
        ops.into_iter()
            .map(|(parent_id, metadata, child_id)| {
                OpMove::new(time.tick(), parent_id, metadata, child_id)
            })
            .collect()
    }

    /// returns this replica's actor id
    #[inline]
    pub fn id(&self) -> &A {
        self.time.actor_id()
    }

    /// returns the latest Lamport time observed by this replica
    #[inline]
    pub fn time(&self) -> &Clock<A> {
        &self.time
    }

    /// returns a reference to the underlying tree `State`
    #[inline]
    pub fn state(&self) -> &State<ID, TM, A> {
        &self.state
    }

    /// returns a reference to the tree
    #[inline]
    pub fn tree(&self) -> &Tree<ID, TM> {
        self.state.tree()
    }

    /// returns a mutable reference to the tree.
    ///
    /// Warning: see `State::tree_mut` — bypasses undo/redo bookkeeping.
    #[inline]
    pub fn tree_mut(&mut self) -> &mut Tree<ID, TM> {
        self.state.tree_mut()
    }

    /// Applies a single operation: merges the local clock with the op's
    /// timestamp, records the latest-seen timestamp for the op's actor
    /// (if it is a known peer), and applies it to the underlying state.
    pub fn apply_op(&mut self, op: OpMove<ID, TM, A>) -> Result<(), TreeError> {
        self.time = self.time.merge(op.timestamp());

        let actor = op.timestamp().actor_id();
        if self.known_peers.contains(actor) {
            match self.latest_time_by_replica.get(actor) {
                Some(latest) if op.timestamp() <= latest => {
                    debug!(
                        "latest-seen clock for {:?} not advanced: have {:?}, op carries {:?}",
                        actor,
                        latest,
                        op.timestamp()
                    );
                }
                _ => {
                    self.latest_time_by_replica
                        .insert(actor.clone(), op.timestamp().clone());
                }
            }
        }

        self.state.apply_op(op)
    }

    /// Applies a list of operations in order, stopping at the first error.
    pub fn apply_ops(&mut self, ops: Vec<OpMove<ID, TM, A>>) -> Result<(), TreeError> {
        for op in ops {
            self.apply_op(op)?;
        }
        Ok(())
    }

    /// Applies a list of operations by reference, cloning each.
    pub fn apply_ops_byref(&mut self, ops: &[OpMove<ID, TM, A>]) -> Result<(), TreeError> {
        self.apply_ops(ops.to_vec())
    }

    /// Applies a single log entry, received from a remote replica. Its
    /// `oldp` field is discarded; this replica's engine recomputes its own
    /// during `do_op`/`redo_op`.
    pub fn apply_log_op(&mut self, log_op: LogOpMove<ID, TM, A>) -> Result<(), TreeError> {
        self.apply_op(log_op.into())
    }

    /// Applies a batch of log entries received from a remote replica. This
    /// is the cross-replica ingest path: entries may arrive in any order,
    /// and the engine's undo/redo scheme converges regardless.
    pub fn apply_log_ops(&mut self, log_ops: Vec<LogOpMove<ID, TM, A>>) -> Result<(), TreeError> {
        for log_op in log_ops {
            self.apply_log_op(log_op)?;
        }
        Ok(())
    }

    /// Returns the causally stable threshold: the minimum of the latest
    /// timestamp observed from each known peer. `None` until every known
    /// peer has contributed at least one timestamp — until then no
    /// threshold can be safely computed, since an unheard-from peer might
    /// still redeliver an arbitrarily old operation.
    pub fn causally_stable_threshold(&self) -> Option<&Clock<A>> {
        if self.known_peers.is_empty()
            || self.known_peers.len() != self.latest_time_by_replica.len()
        {
            return None;
        }
        self.latest_time_by_replica.values().min()
    }

    /// Truncates log entries below the causally stable threshold.
    /// Returns true iff a threshold was defined and at least one entry was
    /// removed.
    pub fn truncate_log(&mut self) -> bool {
        match self.causally_stable_threshold().cloned() {
            Some(t) => self.state.truncate_log_before(&t),
            None => false,
        }
    }
}
