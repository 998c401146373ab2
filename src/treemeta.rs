/// `TreeMeta` is the app-defined payload an application attaches to each
/// parent-child edge of the tree (e.g. a filename, or an inode's attributes).
pub trait TreeMeta: Clone {}
impl<TM: Clone> TreeMeta for TM {}
