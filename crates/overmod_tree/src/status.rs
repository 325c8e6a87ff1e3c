//! Change-status state machine shared by folders and mods.

use std::fmt;

/// Per-node change marker driving whether `update()` performs work.
///
/// The variants are declared in severity order, so the derived `Ord` gives
/// `Unchanged < Added < Updated < Removed`. Within one scan pass a status
/// only ever moves up in severity, never back down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    /// Nothing changed since the last update; the next update is a no-op.
    Unchanged,
    /// Discovered for the first time during the latest scan. Aggregation
    /// treats this the same as [`Updated`](Status::Updated).
    Added,
    /// Something here (or beneath here) changed and must be re-applied.
    Updated,
    /// Disappeared from disk; must be torn down and garbage-collected.
    Removed,
}

impl Status {
    /// Whether the next update has work to do for this node.
    pub fn needs_update(self) -> bool {
        self != Status::Unchanged
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Unchanged => "unchanged",
            Status::Added => "added",
            Status::Updated => "updated",
            Status::Removed => "removed",
        };
        f.write_str(s)
    }
}
