use super::ino::ActorId;

/// How `Filesystem::reconcile_names` resolves a directory that, after
/// merging remote operations, ended up with two or more children sharing
/// the same name.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// every colliding child is renamed to `<name>.conflict.<creator_actor_id>`,
    /// including the one that would otherwise be considered to "win" —
    /// no entry is silently preferred.
    RenameAll,
    /// the child with the newest timestamp keeps `name`; every other
    /// colliding child is renamed as in `RenameAll`.
    LastWriterWins,
}

/// formats the renamed name for a colliding child created by `creator`.
pub(crate) fn conflict_name(name: &str, creator: ActorId) -> String {
    format!("{}.conflict.{}", name, creator)
}
