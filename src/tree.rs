use serde::{Deserialize, Serialize};
use std::cmp::{Eq, PartialEq};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fmt::Debug;

use super::{TreeId, TreeMeta, TreeNode};

/// `Tree` is a set of `(parent, meta, child)` triples representing the
/// current tree structure.
///
/// Normally this struct is not instantiated directly — use `State` (lower
/// level) or `TreeReplica` (higher level) to manipulate it, since those
/// enforce the move-op algorithm's cycle/no-duplicate-parent invariants.
/// `Tree` itself performs no such checks; it is just the triple-set.
///
/// From the paper:
/// ----
/// We can represent the tree as a set of (parent, meta, child)
/// triples. When we have (p, m, c) in tree, that means c is a child of p
/// in the tree, with associated metadata m. Given a tree, we can construct
/// a new tree' in which the child c is moved to a new parent p, with
/// associated metadata m, as follows:
///
/// tree' = {(p', m', c') in tree. c' != c} union {(p, m, c)}
///
/// That is, we remove any existing parent-child relationship for c from
/// the set tree, and then add {(p, m, c)} to represent the new
/// parent-child relationship.
/// ----
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree<ID: TreeId, TM: TreeMeta> {
    triples: HashMap<ID, TreeNode<ID, TM>>, // tree nodes, indexed by child_id.
    children: HashMap<ID, HashSet<ID>>,     // parent_id => {child_id}. index/optimization.
}

impl<ID: TreeId, TM: TreeMeta> Tree<ID, TM> {
    /// create a new, empty Tree
    pub fn new() -> Self {
        Self {
            triples: HashMap::new(),
            children: HashMap::new(),
        }
    }

    /// removes the triple for `child_id`, if any, keeping the inverse index
    /// in sync.
    pub fn rm_child(&mut self, child_id: &ID) {
        if let Some(t) = self.triples.get(child_id) {
            if let Some(siblings) = self.children.get_mut(t.parent_id()) {
                siblings.remove(child_id);
                if siblings.is_empty() {
                    self.children.remove(t.parent_id());
                }
            }
            self.triples.remove(child_id);
        }
    }

    /// removes an entire subtree rooted at `parent_id`. Useful for emptying
    /// trash once a replica's log is causally stable past the deletion.
    /// Not used by the core move-op algorithm itself.
    pub fn rm_subtree(&mut self, parent_id: &ID, include_parent: bool) {
        for c in self.children(parent_id) {
            self.rm_subtree(&c, false);
            self.rm_child(&c);
        }
        if include_parent {
            self.rm_child(parent_id)
        }
    }

    /// adds a (child_id -> node) triple to the tree, updating the inverse
    /// index atomically.
    pub fn add_node(&mut self, child_id: ID, node: TreeNode<ID, TM>) {
        self.children
            .entry(node.parent_id().to_owned())
            .or_insert_with(HashSet::new)
            .insert(child_id.to_owned());
        self.triples.insert(child_id, node);
    }

    /// returns the matching node, or `None` if `child_id` has no entry.
    pub fn find(&self, child_id: &ID) -> Option<&TreeNode<ID, TM>> {
        self.triples.get(child_id)
    }

    /// returns the ids of the children of `parent_id`. Not used by the core
    /// algorithm; a convenience for callers walking the tree.
    pub fn children(&self, parent_id: &ID) -> Vec<ID> {
        match self.children.get(parent_id) {
            Some(set) => set.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// walks the tree depth-first starting at `parent_id`, calling `f` for
    /// every node visited (including `parent_id` itself). Iterative (stack
    /// based), so walking a deep tree cannot overflow the call stack.
    pub fn walk<F>(&self, parent_id: &ID, mut f: F)
    where
        F: FnMut(&Self, &ID, usize),
    {
        let mut stack: Vec<ID> = vec![parent_id.clone()];
        while let Some(next) = stack.pop() {
            f(self, &next, stack.len());
            for child in self.children(&next) {
                stack.push(child);
            }
        }
    }

    /// returns true if `ancestor_id` is an ancestor of `child_id` in the
    /// tree (walking parent pointers from `child_id` upward).
    ///
    /// ```text
    /// parent | child
    /// --------------
    /// 1        2
    /// 1        3
    /// 3        5
    /// 2        6
    /// 6        8
    ///
    ///                  1
    ///               2     3
    ///             6         5
    ///           8
    ///
    /// is 2 ancestor of 8?  yes.
    /// is 2 ancestor of 5?  no.
    /// ```
    pub fn is_ancestor(&self, child_id: &ID, ancestor_id: &ID) -> bool {
        let mut target_id = child_id;
        while let Some(n) = self.find(target_id) {
            if n.parent_id() == ancestor_id {
                return true;
            }
            target_id = n.parent_id();
        }
        false
    }

    /// total number of nodes (triples) in the tree
    pub fn num_nodes(&self) -> usize {
        self.triples.len()
    }
}

/// Iterates all `(child_id, TreeNode)` pairs. Useful for walking every node
/// in the tree without knowing a starting point.
impl<ID: TreeId, TM: TreeMeta> IntoIterator for Tree<ID, TM> {
    type Item = (ID, TreeNode<ID, TM>);
    type IntoIter = std::collections::hash_map::IntoIter<ID, TreeNode<ID, TM>>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<ID: TreeId + Debug, TM: TreeMeta + Debug> fmt::Display for Tree<ID, TM> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.print_tree(f)
    }
}

impl<ID: TreeId + Debug, TM: TreeMeta + Debug> Tree<ID, TM> {
    fn print_treenode(
        &self,
        f: &mut fmt::Formatter<'_>,
        node_id: &ID,
        depth: usize,
    ) -> fmt::Result {
        let meta = match self.find(node_id) {
            Some(tn) => format!("{:?} [{:?}]", node_id, tn.metadata()),
            None => format!("{:?}", node_id),
        };
        let mut result = writeln!(f, "{:indent$}{}", "", meta, indent = depth * 2);

        for c in self.children(node_id) {
            result = self.print_treenode(f, &c, depth + 1);
            if result.is_err() {
                break;
            }
        }
        result
    }

    fn print_tree(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut r: fmt::Result = Ok(());
        let mut seen: HashSet<ID> = Default::default();

        // Find top-level nodes (those whose parent id has no triple of its
        // own) and print a subtree for each.
        // PERF: O(n) scan over all triples; fine for debugging, not a hot path.
        for treenode in self.triples.values() {
            let p = treenode.parent_id();
            if self.triples.get(p).is_none() && !seen.contains(p) {
                seen.insert(p.clone());
                r = self.print_treenode(f, p, 0);
                if r.is_err() {
                    break;
                }
            }
        }
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn add_find_rm_roundtrip() {
        let mut t: Tree<u8, &str> = Tree::new();
        t.add_node(2, TreeNode::new(1, "a"));
        t.add_node(3, TreeNode::new(1, "b"));
        assert_eq!(t.find(&2).unwrap().metadata(), &"a");
        assert_eq!(t.children(&1).len(), 2);

        t.rm_child(&2);
        assert!(t.find(&2).is_none());
        assert_eq!(t.children(&1), vec![3]);
    }

    #[test]
    fn is_ancestor_walks_parent_chain() {
        let mut t: Tree<u8, ()> = Tree::new();
        t.add_node(2, TreeNode::new(1, ()));
        t.add_node(6, TreeNode::new(2, ()));
        t.add_node(8, TreeNode::new(6, ()));
        t.add_node(3, TreeNode::new(1, ()));
        t.add_node(5, TreeNode::new(3, ()));

        assert!(t.is_ancestor(&8, &2));
        assert!(!t.is_ancestor(&5, &2));
    }

    #[test]
    fn rm_subtree_removes_all_descendants() {
        let mut t: Tree<u8, ()> = Tree::new();
        t.add_node(2, TreeNode::new(1, ()));
        t.add_node(3, TreeNode::new(2, ()));
        t.add_node(4, TreeNode::new(2, ()));

        t.rm_subtree(&2, true);
        assert!(t.find(&2).is_none());
        assert!(t.find(&3).is_none());
        assert!(t.find(&4).is_none());
    }
}
