//! Mod entity abstraction.
//!
//! The engine resolves *which* mods win and *in what order* their files are
//! applied; the physical mechanics of getting files onto disk (copying,
//! linking, registering with the host) live behind [`ModEntity`]. The trait
//! is object-safe and entities are stored as `Box<dyn ModEntity>` inside
//! their owning folder, so any storage or installation strategy can plug in.

use crate::error::Result;
use crate::status::Status;
use camino::Utf8Path;

/// One discovered mod, owned by the folder node it was found under.
///
/// # Contract
///
/// - `scan()` re-examines the mod's own content (opaque to the engine) and
///   replaces the current status with the outcome: `Unchanged` if nothing
///   moved, `Updated` if files changed, or leaves `Added` in place on the
///   first scan after creation. The owning folder pre-marks every tracked
///   mod `Removed` before its walk; a mod whose directory vanished simply
///   never gets `scan()` called and keeps that mark.
/// - `priority` is assigned by the owning folder from its policy layer on
///   every rediscovery; entities just store it.
/// - `uninstall()` removes or reverts files this mod previously installed
///   but should no longer manage. `install()` (re)applies the files the mod
///   currently supplies. Both are invoked by the folder's two-phase update
///   in ascending priority order.
pub trait ModEntity {
    /// Current change status.
    fn status(&self) -> Status;

    /// Replace the current change status. Called by the owning folder during
    /// the mark phase of a scan and at the end of an update.
    fn set_status(&mut self, status: Status);

    /// Priority rank used for conflict resolution; higher wins.
    fn priority(&self) -> i32;

    /// Store the priority assigned by the owning folder's policy.
    fn set_priority(&mut self, priority: i32);

    /// Re-examine this mod's content and refresh its status.
    fn scan(&mut self);

    /// Phase 1: retract files this mod should no longer own.
    fn uninstall(&mut self) -> Result<()>;

    /// Phase 2: apply the files this mod currently supplies.
    fn install(&mut self) -> Result<()>;

    /// Settle the mod after a successful update.
    fn mark_unchanged(&mut self) {
        self.set_status(Status::Unchanged);
    }
}

/// Creates mod entities as the scan discovers them.
///
/// Called at most once per (folder, name) pair for as long as the entity
/// stays on disk — rediscoveries reuse the existing entity. Allocating any
/// unique identifiers a mod needs is the factory's business.
pub trait ModFactory {
    /// Create the entity for a newly discovered mod directory.
    ///
    /// `path` is the absolute mod directory; `name` is the normalized name
    /// the tree will track it under. The returned entity's status is forced
    /// to [`Status::Added`] by the caller before its first `scan()`.
    fn create(&mut self, path: &Utf8Path, name: &str) -> Box<dyn ModEntity>;
}
