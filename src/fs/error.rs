use thiserror::Error;

/// Errors raised by the `Filesystem` projection. Distinct from `TreeError`
/// (the move-tree engine's own protocol-invariant errors): these describe
/// filesystem-shaped constraint violations a caller can reasonably trigger
/// and recover from, not an internal bug.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FsError {
    /// `mknod`/`mkdir`/`symlink` with a name that already exists in the
    /// parent directory.
    #[error("an entry with that name already exists")]
    AlreadyExists,
    /// an operation that requires a directory (e.g. `readdir`, `mknod`'s
    /// parent) was given a non-directory inode.
    #[error("inode is not a directory")]
    NotADirectory,
    /// `readlink` on an inode that is not a symlink.
    #[error("inode is not a symlink")]
    NotASymlink,
    /// `rmdir` on a directory that still has children.
    #[error("directory is not empty")]
    DirectoryNotEmpty,
    /// an ino does not resolve to any live node — distinct from
    /// `lookup`'s miss sentinel, this covers the internal "ino must
    /// exist" case (e.g. `read`, `attr`, `unlink`'s target).
    #[error("no such inode")]
    NotFound,
    /// an entry name exceeded the filesystem's name-length bound.
    #[error("name exceeds the maximum allowed length")]
    NameTooLong,
}
