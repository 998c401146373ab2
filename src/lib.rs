//! Operation-based CRDTs for replicated trees and filesystems.
//!
//! The core is a replicated move-tree: a set of `(parent, metadata,
//! child)` triples mutated solely through `op_move`, with an undo/redo
//! log that makes the result independent of the order operations arrive
//! in. This is an implementation of the tree CRDT described in "A
//! highly-available move operation for replicated trees and distributed
//! filesystems" by Martin Kleppmann, et al.
//! <https://martin.kleppmann.com/papers/move-op.pdf>. For clarity, data
//! structures are named the same as in the paper (`State`, `Tree`) or
//! close to it (`OpMove` --> Move, `LogOpMove` --> LogMove). Some are not
//! explicitly named in the paper: `TreeId`, `TreeMeta`, `TreeNode`,
//! `Clock`.
//!
//! On top of the tree CRDT, the [`fs`] module projects a FUSE-shaped
//! filesystem (directories, hard-linked files, symlinks) onto it, and
//! [`counters`] plus [`vclock`] provide a small family of auxiliary
//! counter CRDTs unrelated to the tree but useful alongside it (e.g. a
//! bounded counter for per-replica storage quota).
//!
//! For usage, see `tests/tree.rs`, `tests/fs.rs`, `demos/tree_demo.rs` and
//! `demos/fs_demo.rs`.
#![deny(missing_docs)]

mod tree;
pub use self::tree::Tree;

mod state;
pub use self::state::State;

mod clock;
pub use self::clock::Clock;

mod opmove;
pub use self::opmove::OpMove;

mod logopmove;
pub use self::logopmove::LogOpMove;

mod treeid;
pub use self::treeid::TreeId;

mod treemeta;
pub use self::treemeta::TreeMeta;

mod treenode;
pub use self::treenode::TreeNode;

mod treereplica;
pub use self::treereplica::TreeReplica;

mod error;
pub use self::error::TreeError;

mod vclock;
pub use self::vclock::VClock;

pub mod counters;
pub mod fs;
