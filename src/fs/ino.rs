use serde::{Deserialize, Serialize};
use std::fmt;

/// The actor/replica identifier used throughout the filesystem projection.
/// A plain `u32` satisfies `crdts::Actor`'s `Ord + Clone + Hash` bound via
/// its blanket impl, same as the teacher's tests use `Clock<u8>`.
pub type ActorId = u32;

/// A filesystem inode identifier, and the `TreeId` used by `Filesystem`'s
/// underlying `TreeReplica<Ino, FsMeta, ActorId>`.
///
/// Low 32 bits are a counter private to the creating replica; high 32 bits
/// are that replica's `ActorId`. Two replicas minting inodes concurrently
/// can therefore never collide, without either consulting the other or
/// maintaining a shared allocation table (Design Notes "by-reference
/// aliasing" resolution).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ino(u64);

impl Ino {
    /// The lookup-miss sentinel: a cacheable "definitely does not exist"
    /// inode, returned by `Filesystem::lookup` on a miss. No replica ever
    /// mints this value for a real node, since every minted `Ino` carries
    /// a nonzero low-bits counter.
    pub const NULL: Ino = Ino(0);

    /// constructs the inode a given replica mints as the `counter`-th node
    /// it has created.
    pub fn new(actor: ActorId, counter: u32) -> Self {
        Ino(((actor as u64) << 32) | counter as u64)
    }

    /// a well-known inode shared by every replica, not tied to any single
    /// creator — used for the fixed tree roots (`root`, `fileinodes`,
    /// `trash`) that `Filesystem::init` creates identically everywhere.
    pub(crate) const fn well_known(n: u32) -> Self {
        Ino(n as u64)
    }

    /// returns the lookup-miss sentinel.
    pub fn zero() -> Self {
        Self::NULL
    }

    /// true iff this is the lookup-miss sentinel.
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// returns the replica id embedded in this inode's high bits. Not
    /// meaningful for well-known inodes.
    pub fn creator(&self) -> ActorId {
        (self.0 >> 32) as u32
    }

    /// returns the raw 64-bit value, e.g. for exposing to a real FUSE
    /// binding as a `u64` inode number.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ino {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn distinct_replicas_never_collide() {
        let a = Ino::new(1, 1);
        let b = Ino::new(2, 1);
        assert_ne!(a, b);
        assert_eq!(a.creator(), 1);
        assert_eq!(b.creator(), 2);
    }

    #[test]
    fn zero_is_null() {
        assert!(Ino::zero().is_null());
        assert!(!Ino::new(1, 1).is_null());
    }
}
