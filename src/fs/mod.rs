//! A FUSE-shaped filesystem projection over the move-tree engine: paths,
//! directories, hard-linked files, and symlinks, each expressed as batches
//! of `op_move`s against a `TreeReplica<Ino, FsMeta, ActorId>`.
//!
//! This module does not mount onto an actual kernel FUSE interface,
//! persist anything to disk, or perform any authentication — see the
//! crate's non-goals.

mod conflict;
mod error;
mod filesystem;
mod ino;
mod meta;

pub use self::conflict::ConflictPolicy;
pub use self::error::FsError;
pub use self::filesystem::Filesystem;
pub use self::ino::{ActorId, Ino};
pub use self::meta::FsMeta;
