//! Error types for the resolution engine.
//!
//! Scan and update are best-effort and surface per-folder damage as statuses
//! rather than errors (config failures become default policy, bad glob
//! fragments are skipped), so [`Error`] only appears at the one fallible
//! seam: the install/uninstall operations of a [`ModEntity`](crate::ModEntity).
//! The engine logs these failures and continues with the remaining mods.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors a mod entity can report from its install-phase operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed while applying or retracting files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A mod entity failed to install or uninstall its files.
    #[error("install error: {0}")]
    Install(String),
}
