use serde::{Deserialize, Serialize};
use std::cmp::{Eq, PartialEq};

use super::{TreeId, TreeMeta};

/// `TreeNode` is a node stored inside a `Tree`.
///
/// Logically, each `TreeNode` together with its key forms a
/// `(parent_id, metadata, child_id)` triple. In this implementation the
/// `child_id` is stored only as the key of `Tree`'s `HashMap<ID, TreeNode>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode<ID: TreeId, TM: TreeMeta> {
    parent_id: ID,
    metadata: TM,
}

impl<ID: TreeId, TM: TreeMeta> TreeNode<ID, TM> {
    /// creates a new `TreeNode` instance
    pub fn new(parent_id: ID, metadata: TM) -> Self {
        Self {
            parent_id,
            metadata,
        }
    }

    /// returns `parent_id` reference
    pub fn parent_id(&self) -> &ID {
        &self.parent_id
    }

    /// returns metadata reference
    pub fn metadata(&self) -> &TM {
        &self.metadata
    }
}
