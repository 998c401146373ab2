use log::debug;

use super::conflict::{conflict_name, ConflictPolicy};
use super::error::FsError;
use super::ino::{ActorId, Ino};
use super::meta::FsMeta;
use crate::{Clock, TreeError, TreeReplica};

const MAX_NAME_LEN: usize = 255;

/// A FUSE-shaped filesystem built on top of a `TreeReplica<Ino, FsMeta,
/// ActorId>`. Every mutating method maps one named operation onto a batch
/// of `op_move`s applied atomically via `TreeReplica::apply_ops`; nothing
/// here bypasses the underlying CRDT engine, so two `Filesystem`s that
/// apply the same operations (in any order, via `apply_log_ops`) converge
/// to the same tree.
///
/// This is a userspace projection only — it does not mount onto a kernel
/// FUSE interface, persist to disk, or enforce any access control; see the
/// crate's non-goals.
#[derive(Debug, Clone)]
pub struct Filesystem {
    replica: TreeReplica<Ino, FsMeta, ActorId>,
    root: Ino,
    fileinodes: Ino,
    trash: Ino,
    next_counter: u32,
}

impl Filesystem {
    /// Creates a new filesystem for replica `actor`, with the three
    /// well-known roots (`root`, `fileinodes`, `trash`) available.
    ///
    /// Unlike ordinary nodes, the roots are never created via `op_move` —
    /// they are a fixed, parentless convention every replica agrees on
    /// without coordination, so `init` performs no tree mutation at all.
    pub fn init(actor: ActorId) -> Self {
        Self {
            replica: TreeReplica::new(actor),
            root: Ino::well_known(1),
            fileinodes: Ino::well_known(2),
            trash: Ino::well_known(3),
            next_counter: 0,
        }
    }

    /// returns the root directory's inode.
    pub fn root(&self) -> Ino {
        self.root
    }

    /// returns the underlying replica, e.g. to drive `apply_log_ops` for
    /// cross-replica merges or `add_peer`/`causally_stable_threshold` for
    /// log truncation.
    pub fn replica(&self) -> &TreeReplica<Ino, FsMeta, ActorId> {
        &self.replica
    }

    /// returns a mutable reference to the underlying replica.
    pub fn replica_mut(&mut self) -> &mut TreeReplica<Ino, FsMeta, ActorId> {
        &mut self.replica
    }

    fn next_ino(&mut self) -> Ino {
        self.next_counter += 1;
        Ino::new(*self.replica.id(), self.next_counter)
    }

    fn is_well_known(&self, ino: Ino) -> bool {
        ino == self.root || ino == self.fileinodes || ino == self.trash
    }

    fn check_is_directory(&self, ino: Ino) -> Result<(), FsError> {
        if self.is_well_known(ino) {
            return Ok(());
        }
        match self.replica.tree().find(&ino) {
            Some(node) if node.metadata().is_dir() => Ok(()),
            Some(_) => Err(FsError::NotADirectory),
            None => Err(FsError::NotFound),
        }
    }

    fn check_name_len(&self, name: &str) -> Result<(), FsError> {
        if name.len() > MAX_NAME_LEN {
            Err(FsError::NameTooLong)
        } else {
            Ok(())
        }
    }

    /// looks up `name` among `parent`'s children, returning its inode, or
    /// `Ino::NULL` if there is no such entry (a cacheable negative lookup,
    /// not an error).
    pub fn lookup(&self, parent: Ino, name: &str) -> Ino {
        for child in self.replica.tree().children(&parent) {
            if let Some(node) = self.replica.tree().find(&child) {
                if node.metadata().name() == Some(name) {
                    return child;
                }
            }
        }
        Ino::NULL
    }

    /// resolves `ino` to the file inode it ultimately addresses: if `ino`
    /// is itself a `FileInode`, returns it unchanged; if it is a
    /// `FileRef`, returns the inode it points at. Used by `read`/`write`/
    /// `attr` so callers can pass either a directory-entry inode or the
    /// underlying file-inode id interchangeably.
    fn resolve_file_inode(&self, ino: Ino) -> Result<Ino, FsError> {
        let node = self.replica.tree().find(&ino).ok_or(FsError::NotFound)?;
        match node.metadata() {
            FsMeta::FileInode { .. } => Ok(ino),
            FsMeta::FileRef { inode_id, .. } => Ok(*inode_id),
            _ => Err(FsError::NotFound),
        }
    }

    /// Creates a new directory named `name` under `parent`.
    pub fn mkdir(&mut self, parent: Ino, name: &str, now: i64) -> Result<Ino, FsError> {
        self.check_is_directory(parent)?;
        self.check_name_len(name)?;
        if !self.lookup(parent, name).is_null() {
            return Err(FsError::AlreadyExists);
        }

        let id = self.next_ino();
        let meta = FsMeta::Dir {
            name: name.to_string(),
            size: 0,
            ctime: now,
            mtime: now,
        };
        let op = self.replica.opmove(parent, meta, id);
        self.replica.apply_op(op).expect("freshly minted ino cannot collide with an existing timestamp");
        Ok(id)
    }

    /// Creates a new regular file named `name` under `parent`: a fresh
    /// file-inode under `fileinodes` with `link_count = 1`, plus a
    /// file-ref under `parent` pointing at it. Returns the file-ref's
    /// inode (the id `lookup`/`readdir` will report for this entry).
    pub fn mknod(&mut self, parent: Ino, name: &str, now: i64) -> Result<Ino, FsError> {
        self.check_is_directory(parent)?;
        self.check_name_len(name)?;
        if !self.lookup(parent, name).is_null() {
            return Err(FsError::AlreadyExists);
        }

        let inode_id = self.next_ino();
        let ref_id = self.next_ino();
        let ops = self.replica.opmoves(vec![
            (
                self.fileinodes,
                FsMeta::FileInode {
                    size: 0,
                    ctime: now,
                    mtime: now,
                    link_count: 1,
                    content: Vec::new(),
                },
                inode_id,
            ),
            (
                parent,
                FsMeta::FileRef {
                    name: name.to_string(),
                    inode_id,
                },
                ref_id,
            ),
        ]);
        self.replica
            .apply_ops(ops)
            .expect("freshly minted inos cannot collide with an existing timestamp");
        Ok(ref_id)
    }

    /// Creates a new hard link named `name` under `parent`, pointing at
    /// the same file-inode as `target_ino` (which may itself be a ref or
    /// a direct file-inode id). Increments the target's `link_count`.
    pub fn link(&mut self, target_ino: Ino, parent: Ino, name: &str, now: i64) -> Result<Ino, FsError> {
        self.check_is_directory(parent)?;
        self.check_name_len(name)?;
        if !self.lookup(parent, name).is_null() {
            return Err(FsError::AlreadyExists);
        }
        let inode_id = self.resolve_file_inode(target_ino)?;
        let (size, ctime, link_count, content) = match self.replica.tree().find(&inode_id) {
            Some(node) => match node.metadata() {
                FsMeta::FileInode {
                    size,
                    ctime,
                    link_count,
                    content,
                    ..
                } => (*size, *ctime, *link_count, content.clone()),
                _ => return Err(FsError::NotFound),
            },
            None => return Err(FsError::NotFound),
        };

        let ref_id = self.next_ino();
        let ops = self.replica.opmoves(vec![
            (
                self.fileinodes,
                FsMeta::FileInode {
                    size,
                    ctime,
                    mtime: now,
                    link_count: link_count + 1,
                    content,
                },
                inode_id,
            ),
            (
                parent,
                FsMeta::FileRef {
                    name: name.to_string(),
                    inode_id,
                },
                ref_id,
            ),
        ]);
        self.replica
            .apply_ops(ops)
            .expect("freshly minted ref cannot collide with an existing timestamp");
        Ok(ref_id)
    }

    /// Removes the `name` entry from `parent`. If it was the last
    /// reference to its file-inode (`link_count` reaches 0), the inode
    /// itself is moved to `trash` too — no resurrection, per the file
    /// inode lifecycle state machine.
    pub fn unlink(&mut self, parent: Ino, name: &str, now: i64) -> Result<(), FsError> {
        let ref_id = self.lookup(parent, name);
        if ref_id.is_null() {
            return Err(FsError::NotFound);
        }
        let inode_id = match self.replica.tree().find(&ref_id) {
            Some(node) => match node.metadata() {
                FsMeta::FileRef { inode_id, .. } => *inode_id,
                _ => return Err(FsError::NotFound),
            },
            None => return Err(FsError::NotFound),
        };

        let mut batch = vec![(self.trash, FsMeta::Trashed, ref_id)];

        match self.replica.tree().find(&inode_id) {
            Some(node) => match node.metadata() {
                FsMeta::FileInode {
                    size,
                    ctime,
                    link_count,
                    content,
                    ..
                } => {
                    if *link_count <= 1 {
                        batch.push((self.trash, FsMeta::Trashed, inode_id));
                    } else {
                        batch.push((
                            self.fileinodes,
                            FsMeta::FileInode {
                                size: *size,
                                ctime: *ctime,
                                mtime: now,
                                link_count: link_count - 1,
                                content: content.clone(),
                            },
                            inode_id,
                        ));
                    }
                }
                _ => return Err(FsError::NotFound),
            },
            None => return Err(FsError::NotFound),
        }

        let ops = self.replica.opmoves(batch);
        self.replica
            .apply_ops(ops)
            .expect("unlink batch timestamps are freshly minted");
        Ok(())
    }

    /// Moves the `name` entry of `parent` to `newname` under `newparent`.
    pub fn rename(
        &mut self,
        parent: Ino,
        name: &str,
        newparent: Ino,
        newname: &str,
    ) -> Result<(), FsError> {
        self.check_is_directory(newparent)?;
        self.check_name_len(newname)?;
        let child_id = self.lookup(parent, name);
        if child_id.is_null() {
            return Err(FsError::NotFound);
        }
        if !self.lookup(newparent, newname).is_null() {
            return Err(FsError::AlreadyExists);
        }

        let meta = self
            .replica
            .tree()
            .find(&child_id)
            .ok_or(FsError::NotFound)?
            .metadata()
            .with_name(newname);
        let op = self.replica.opmove(newparent, meta, child_id);
        self.replica
            .apply_op(op)
            .expect("rename reuses an existing child_id with a fresh timestamp");
        Ok(())
    }

    /// Removes the empty directory `name` under `parent`.
    pub fn rmdir(&mut self, parent: Ino, name: &str) -> Result<(), FsError> {
        let child_id = self.lookup(parent, name);
        if child_id.is_null() {
            return Err(FsError::NotFound);
        }
        match self.replica.tree().find(&child_id) {
            Some(node) if node.metadata().is_dir() => {}
            Some(_) => return Err(FsError::NotADirectory),
            None => return Err(FsError::NotFound),
        }
        if !self.replica.tree().children(&child_id).is_empty() {
            return Err(FsError::DirectoryNotEmpty);
        }

        let op = self.replica.opmove(self.trash, FsMeta::Trashed, child_id);
        self.replica
            .apply_op(op)
            .expect("rmdir reuses an existing child_id with a fresh timestamp");
        Ok(())
    }

    /// Creates a symlink named `name` under `parent`, resolving to
    /// `target_path`.
    pub fn symlink(
        &mut self,
        parent: Ino,
        name: &str,
        target_path: &str,
        now: i64,
    ) -> Result<Ino, FsError> {
        self.check_is_directory(parent)?;
        self.check_name_len(name)?;
        if !self.lookup(parent, name).is_null() {
            return Err(FsError::AlreadyExists);
        }

        let id = self.next_ino();
        let meta = FsMeta::Symlink {
            name: name.to_string(),
            size: target_path.len() as u64,
            ctime: now,
            mtime: now,
            target: target_path.to_string(),
        };
        let op = self.replica.opmove(parent, meta, id);
        self.replica
            .apply_op(op)
            .expect("freshly minted ino cannot collide with an existing timestamp");
        Ok(id)
    }

    /// returns the `(name, ino)` pair at `offset` in `dir_ino`'s child
    /// list, or `None` past the end. Children are sorted by `Ino` to give
    /// deterministic traversal order across calls.
    pub fn readdir(&self, dir_ino: Ino, offset: usize) -> Option<(String, Ino)> {
        let mut children = self.replica.tree().children(&dir_ino);
        children.sort();
        let child = *children.get(offset)?;
        let name = self.replica.tree().find(&child)?.metadata().name()?.to_string();
        Some((name, child))
    }

    /// returns the resolved target's content.
    pub fn read(&self, ino: Ino) -> Result<Vec<u8>, FsError> {
        let inode_id = self.resolve_file_inode(ino)?;
        match self.replica.tree().find(&inode_id) {
            Some(node) => match node.metadata() {
                FsMeta::FileInode { content, .. } => Ok(content.clone()),
                _ => Err(FsError::NotFound),
            },
            None => Err(FsError::NotFound),
        }
    }

    /// appends `data` to the resolved target's content.
    ///
    /// This is a prototype: content lives directly in replicated tree
    /// metadata rather than content-addressed storage, so every write
    /// ships the entire file through the CRDT log.
    pub fn write(&mut self, ino: Ino, data: &[u8], now: i64) -> Result<(), FsError> {
        let inode_id = self.resolve_file_inode(ino)?;
        let (ctime, link_count, mut content) = match self.replica.tree().find(&inode_id) {
            Some(node) => match node.metadata() {
                FsMeta::FileInode {
                    ctime,
                    link_count,
                    content,
                    ..
                } => (*ctime, *link_count, content.clone()),
                _ => return Err(FsError::NotFound),
            },
            None => return Err(FsError::NotFound),
        };
        content.extend_from_slice(data);
        let meta = FsMeta::FileInode {
            size: content.len() as u64,
            ctime,
            mtime: now,
            link_count,
            content,
        };
        let op = self.replica.opmove(self.fileinodes, meta, inode_id);
        self.replica
            .apply_op(op)
            .expect("write reuses an existing child_id with a fresh timestamp");
        Ok(())
    }

    /// returns the resolved target's symlink target path.
    pub fn readlink(&self, ino: Ino) -> Result<String, FsError> {
        match self.replica.tree().find(&ino) {
            Some(node) => match node.metadata() {
                FsMeta::Symlink { target, .. } => Ok(target.clone()),
                _ => Err(FsError::NotASymlink),
            },
            None => Err(FsError::NotFound),
        }
    }

    /// returns a clone of `ino`'s metadata.
    pub fn attr(&self, ino: Ino) -> Result<FsMeta, FsError> {
        if self.is_well_known(ino) {
            return Ok(FsMeta::Dir {
                name: String::new(),
                size: self.replica.tree().children(&ino).len() as u64,
                ctime: 0,
                mtime: 0,
            });
        }
        self.replica
            .tree()
            .find(&ino)
            .map(|n| n.metadata().clone())
            .ok_or(FsError::NotFound)
    }

    fn latest_timestamp_for(&self, child_id: &Ino) -> Option<Clock<ActorId>> {
        self.replica
            .state()
            .log()
            .iter()
            .find(|entry| entry.child_id() == child_id)
            .map(|entry| entry.timestamp().clone())
    }

    /// Scans `dir`'s children for name collisions (two or more children
    /// sharing the same `name`, which can arise after merging concurrent
    /// remote operations) and, for each colliding group, applies `policy`
    /// as a batch of rename `op_move`s. Returns the number of entries
    /// renamed.
    ///
    /// This is itself an ordinary replicated operation: applying it on
    /// one replica and shipping the resulting ops to others resolves the
    /// collision everywhere after a second merge round.
    pub fn reconcile_names(&mut self, dir: Ino, policy: ConflictPolicy) -> Result<usize, TreeError> {
        let mut by_name: std::collections::HashMap<String, Vec<Ino>> =
            std::collections::HashMap::new();
        for child in self.replica.tree().children(&dir) {
            if let Some(node) = self.replica.tree().find(&child) {
                if let Some(name) = node.metadata().name() {
                    by_name.entry(name.to_string()).or_default().push(child);
                }
            }
        }

        let mut to_rename: Vec<Ino> = Vec::new();
        for (_name, mut group) in by_name.into_iter() {
            if group.len() < 2 {
                continue;
            }
            if policy == ConflictPolicy::LastWriterWins {
                group.sort_by(|a, b| {
                    self.latest_timestamp_for(b).cmp(&self.latest_timestamp_for(a))
                });
                group.remove(0); // the newest keeps its name.
            }
            to_rename.extend(group);
        }

        if to_rename.is_empty() {
            return Ok(0);
        }
        debug!("reconciling {} colliding name(s) under {:?} via {:?}", to_rename.len(), dir, policy);

        let mut batch = Vec::with_capacity(to_rename.len());
        for child in &to_rename {
            let node = match self.replica.tree().find(child) {
                Some(n) => n,
                None => continue,
            };
            let name = match node.metadata().name() {
                Some(n) => n,
                None => continue,
            };
            let creator = child.creator();
            let new_meta = node.metadata().with_name(&conflict_name(name, creator));
            batch.push((dir, new_meta, *child));
        }

        let renamed = batch.len();
        let ops = self.replica.opmoves(batch);
        self.replica.apply_ops(ops)?;
        Ok(renamed)
    }

    /// Once this replica's log is causally stable, physically drops all
    /// children currently parked under `trash` from the live tree view.
    /// This does not touch the CRDT log (governed solely by
    /// `TreeReplica::truncate_log`) — it only empties the tree's view of
    /// already-dead nodes, mirroring the teacher's `Tree::rm_subtree`
    /// ("useful for emptying trash... not used by crdt algo"). Returns
    /// true iff the threshold was defined and trash was non-empty.
    pub fn trash_subtree_if_stable(&mut self) -> bool {
        if self.replica.causally_stable_threshold().is_none() {
            return false;
        }
        let had_children = !self.replica.tree().children(&self.trash).is_empty();
        self.replica.tree_mut().rm_subtree(&self.trash, false);
        had_children
    }
}
