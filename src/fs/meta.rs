use super::ino::Ino;
use serde::{Deserialize, Serialize};

/// `FsMeta` is the `TreeMeta` payload attached to each parent-child edge in
/// a `Filesystem`'s underlying tree. Tagged variant, not an open record:
/// every edge is exactly one of these kinds, matching the wire format's
/// `dir_inode | file_ref | file_inode | null` variants (spec's Design
/// Notes "metadata as open record" resolution).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsMeta {
    /// a directory entry: `name` is this edge's entry in its parent.
    Dir {
        /// entry name within the parent directory
        name: String,
        /// directory "size" (entry count), app-defined
        size: u64,
        /// creation time, seconds since epoch
        ctime: i64,
        /// last-modified time, seconds since epoch
        mtime: i64,
    },
    /// a symbolic link entry.
    Symlink {
        /// entry name within the parent directory
        name: String,
        /// length of `target`
        size: u64,
        /// creation time, seconds since epoch
        ctime: i64,
        /// last-modified time, seconds since epoch
        mtime: i64,
        /// the path this symlink resolves to
        target: String,
    },
    /// a directory entry referencing a file inode under `fileinodes`
    /// (spec's by-reference/hard-link scheme: the entry and the inode's
    /// content live under different tree roots).
    FileRef {
        /// entry name within the parent directory
        name: String,
        /// the file inode this reference points at
        inode_id: Ino,
    },
    /// a file's content and attributes, parented under `fileinodes` and
    /// addressed by zero or more `FileRef` entries.
    FileInode {
        /// content length
        size: u64,
        /// creation time, seconds since epoch
        ctime: i64,
        /// last-modified time, seconds since epoch
        mtime: i64,
        /// number of `FileRef`s pointing at this inode
        link_count: u32,
        /// file content; a placeholder byte string, not content-addressed
        /// storage — persistence and chunking are out of scope.
        content: Vec<u8>,
    },
    /// the `null` metadata used when moving a node to trash without
    /// otherwise changing it.
    Trashed,
}

impl FsMeta {
    /// returns the entry name, for variants that carry one.
    pub fn name(&self) -> Option<&str> {
        match self {
            FsMeta::Dir { name, .. } => Some(name),
            FsMeta::Symlink { name, .. } => Some(name),
            FsMeta::FileRef { name, .. } => Some(name),
            FsMeta::FileInode { .. } | FsMeta::Trashed => None,
        }
    }

    /// returns a copy of this metadata with `name` replaced, for variants
    /// that carry a name. No-op (returns `self` unchanged) for variants
    /// that don't.
    pub fn with_name(&self, new_name: &str) -> Self {
        match self.clone() {
            FsMeta::Dir {
                size, ctime, mtime, ..
            } => FsMeta::Dir {
                name: new_name.to_string(),
                size,
                ctime,
                mtime,
            },
            FsMeta::Symlink {
                size,
                ctime,
                mtime,
                target,
                ..
            } => FsMeta::Symlink {
                name: new_name.to_string(),
                size,
                ctime,
                mtime,
                target,
            },
            FsMeta::FileRef { inode_id, .. } => FsMeta::FileRef {
                name: new_name.to_string(),
                inode_id,
            },
            other => other,
        }
    }

    /// true iff this is a `Dir` entry.
    pub fn is_dir(&self) -> bool {
        matches!(self, FsMeta::Dir { .. })
    }

    /// true iff this is a `Symlink` entry.
    pub fn is_symlink(&self) -> bool {
        matches!(self, FsMeta::Symlink { .. })
    }

    /// true iff this is a `FileRef` entry.
    pub fn is_file_ref(&self) -> bool {
        matches!(self, FsMeta::FileRef { .. })
    }

    /// true iff this is a `FileInode` entry.
    pub fn is_file_inode(&self) -> bool {
        matches!(self, FsMeta::FileInode { .. })
    }
}
