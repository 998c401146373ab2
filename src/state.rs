use serde::{Deserialize, Serialize};
use std::cmp::{Eq, Ordering, PartialEq};

use super::{Clock, LogOpMove, OpMove, Tree, TreeError, TreeId, TreeMeta, TreeNode};
use crdts::{Actor, CmRDT};
use log::warn;

/// Holds Tree CRDT state and implements the core move-op algorithm.
///
/// `State` is not tied to any actor/peer and should be equal on any two
/// replicas that have applied the same set of operations, regardless of
/// the order they arrived in. For a higher-level interface tied to a
/// particular actor, see `TreeReplica`.
///
/// This is an implementation of the tree CRDT algorithm described in
/// "A highly-available move operation for replicated trees and
/// distributed filesystems" by Martin Kleppmann, et al.
/// <https://martin.kleppmann.com/papers/move-op.pdf>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State<ID: TreeId, TM: TreeMeta, A: Actor> {
    // a list of `LogOpMove` in descending timestamp order.
    log_op_list: Vec<LogOpMove<ID, TM, A>>,

    // a tree structure, ie a set of (parent, meta, child) triples
    // that represent the current state of the tree.
    tree: Tree<ID, TM>,
}

impl<ID: TreeId, TM: TreeMeta, A: Actor> State<ID, TM, A> {
    /// create a new, empty State
    pub fn new() -> Self {
        Self {
            log_op_list: Vec::new(),
            tree: Tree::new(),
        }
    }

    /// returns tree reference
    #[inline]
    pub fn tree(&self) -> &Tree<ID, TM> {
        &self.tree
    }

    /// returns mutable Tree reference.
    ///
    /// Warning: normally the tree should not be mutated directly. This is
    /// exposed for callers that have already truncated the log (e.g. to
    /// physically empty trash) and know they're bypassing the CRDT's
    /// undo/redo bookkeeping.
    #[inline]
    pub fn tree_mut(&mut self) -> &mut Tree<ID, TM> {
        &mut self.tree
    }

    /// returns log reference, newest entry first
    #[inline]
    pub fn log(&self) -> &Vec<LogOpMove<ID, TM, A>> {
        &self.log_op_list
    }

    /// prepends a log entry (the log is kept in descending timestamp order).
    pub fn add_log_entry(&mut self, entry: LogOpMove<ID, TM, A>) {
        self.log_op_list.insert(0, entry);
    }

    /// removes log entries older than `timestamp`. Not part of the core
    /// CRDT algorithm — a pure space-reclamation step, safe only once
    /// `timestamp` is causally stable (see `TreeReplica::causally_stable_threshold`).
    /// Returns true iff at least one entry was removed.
    pub fn truncate_log_before(&mut self, timestamp: &Clock<A>) -> bool {
        let before = self.log_op_list.len();
        self.log_op_list.retain(|entry| entry.timestamp() >= timestamp);
        self.log_op_list.len() < before
    }

    /// `do_op` performs the actual work of applying a move operation.
    ///
    /// Takes a move operation and the current tree, and returns a
    /// `LogOpMove` (to be added to the log) capturing the prior parent of
    /// `op.child_id`, if any.
    pub fn do_op(&mut self, op: OpMove<ID, TM, A>) -> LogOpMove<ID, TM, A> {
        // The oldp field is filled in from the state of the tree *before*
        // the move: None if child_id did not exist, else its previous
        // (parent_id, metadata).
        let oldp = self.tree.find(op.child_id()).cloned();

        // Cycle guard: if the node being moved is (or would become) an
        // ancestor of its new parent, or is its own new parent, the tree
        // is returned unmodified — the operation is silently ignored.
        // This is the algorithm's only rejection rule, and convergence
        // depends on it firing identically on every replica once
        // operations are applied in the same effective order.
        if op.child_id() == op.parent_id() || self.tree.is_ancestor(op.parent_id(), op.child_id())
        {
            return LogOpMove::new(op, oldp);
        }

        // Otherwise, remove any existing parent-child relationship for
        // child_id and install the new one.
        self.tree.rm_child(op.child_id());
        let node = TreeNode::new(op.parent_id().to_owned(), op.metadata().to_owned());
        self.tree.add_node(op.child_id().to_owned(), node);
        LogOpMove::new(op, oldp)
    }

    /// `undo_op` reverses the effect of a previously applied `do_op`,
    /// restoring the exact pre-application state the log entry witnessed.
    pub fn undo_op(&mut self, log: &LogOpMove<ID, TM, A>) {
        self.tree.rm_child(log.child_id());

        if let Some(oldp) = log.oldp() {
            let node = TreeNode::new(oldp.parent_id().to_owned(), oldp.metadata().to_owned());
            self.tree.add_node(log.child_id().to_owned(), node);
        }
    }

    /// `redo_op` re-applies a log entry via `do_op`, recomputing its `oldp`
    /// field (which may have changed due to the effect of the newly
    /// applied operation) rather than carrying over the original.
    pub fn redo_op(&mut self, log: LogOpMove<ID, TM, A>) {
        let op = OpMove::from(log);
        let recomputed = self.do_op(op);
        self.add_log_entry(recomputed);
    }

    /// Applies a move operation to this state, reordering the log via
    /// undo/redo so that the result is independent of arrival order.
    ///
    /// Implemented iteratively rather than via the textbook recursive
    /// formulation (undo head, recurse, redo head) to avoid call-stack
    /// depth proportional to the number of log entries newer than `op`:
    /// entries newer than `op` are popped off the head of the log into a
    /// stack, `op` is applied once the right insertion point is found,
    /// and the popped entries are redone in reverse (oldest-popped-first)
    /// order — the net effect is identical to the recursive version.
    ///
    /// Returns `Err(TreeError::DuplicateTimestamp)` if `op`'s timestamp
    /// collides with an existing log entry's timestamp; the state is left
    /// unchanged in that case (every popped entry is redone before
    /// returning).
    pub fn apply_op(&mut self, op: OpMove<ID, TM, A>) -> Result<(), TreeError> {
        let mut undone: Vec<LogOpMove<ID, TM, A>> = Vec::new();

        loop {
            let cmp = match self.log_op_list.first() {
                None => break,
                Some(head) => op.timestamp().cmp(head.timestamp()),
            };
            match cmp {
                Ordering::Equal => {
                    // Restore everything popped so far: this case must
                    // never occur under the timestamp-uniqueness
                    // invariant, but if it does, the operation is
                    // rejected atomically rather than left half-applied.
                    while let Some(entry) = undone.pop() {
                        self.redo_op(entry);
                    }
                    warn!("op with timestamp equal to log head rejected: every op must have a unique timestamp");
                    return Err(TreeError::DuplicateTimestamp);
                }
                Ordering::Less => {
                    let head = self.log_op_list.remove(0);
                    self.undo_op(&head);
                    undone.push(head);
                }
                Ordering::Greater => break,
            }
        }

        let entry = self.do_op(op);
        self.add_log_entry(entry);

        while let Some(entry) = undone.pop() {
            self.redo_op(entry);
        }

        Ok(())
    }

    /// applies a list of operations, consuming them, stopping (without
    /// rolling back operations already applied) at the first error.
    pub fn apply_ops_into(&mut self, ops: Vec<OpMove<ID, TM, A>>) -> Result<(), TreeError> {
        for op in ops {
            self.apply_op(op)?;
        }
        Ok(())
    }

    /// applies a list of operations by reference, cloning each.
    pub fn apply_ops(&mut self, ops: &[OpMove<ID, TM, A>]) -> Result<(), TreeError> {
        self.apply_ops_into(ops.to_vec())
    }
}

impl<ID: TreeId, A: Actor, TM: TreeMeta> Default for State<ID, TM, A> {
    fn default() -> Self {
        Self::new()
    }
}

type LogOpList<ID, TM, A> = Vec<LogOpMove<ID, TM, A>>;

impl<ID: TreeId, A: Actor, TM: TreeMeta> From<(LogOpList<ID, TM, A>, Tree<ID, TM>)>
    for State<ID, TM, A>
{
    fn from(e: (LogOpList<ID, TM, A>, Tree<ID, TM>)) -> Self {
        Self {
            log_op_list: e.0,
            tree: e.1,
        }
    }
}

impl<ID: TreeId, TM: TreeMeta, A: Actor> CmRDT for State<ID, TM, A> {
    type Op = OpMove<ID, TM, A>;

    /// Applies an operation, panicking on a `TreeError`.
    ///
    /// `CmRDT::apply` has no room in its signature for a `Result`; callers
    /// who can't guarantee unique timestamps should call `apply_op`
    /// directly instead of going through this trait impl.
    fn apply(&mut self, op: Self::Op) {
        self.apply_op(op).expect("CmRDT::apply requires a unique operation timestamp; use State::apply_op for fallible application");
    }
}

/// Iterates all `(child_id, TreeNode)` pairs, useful for walking every node
/// in the tree without knowing a starting point.
impl<ID: TreeId, TM: TreeMeta, A: Actor> IntoIterator for State<ID, TM, A> {
    type Item = (ID, TreeNode<ID, TM>);
    type IntoIter = std::collections::hash_map::IntoIter<ID, TreeNode<ID, TM>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

// See tests/tree.rs and tests/quickcheck.rs for the convergence properties.
