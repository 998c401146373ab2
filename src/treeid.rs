use std::hash::Hash;

/// `TreeId` are unique identifiers for each node in a tree. Any type that is
/// cheaply comparable, cloneable and hashable qualifies — this crate never
/// requires `Ord` on ids, only on [`crate::Clock`]'s actor component.
pub trait TreeId: Eq + Clone + Hash {}
impl<ID: Eq + Clone + Hash> TreeId for ID {}
