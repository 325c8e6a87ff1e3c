//! Hierarchical mod-overlay resolution engine.
//!
//! This crate scans a directory hierarchy of installable mods, applies
//! per-folder inclusion/exclusion/priority policy, detects incremental
//! changes between scans, and drives a two-phase uninstall/install protocol
//! so that the highest-priority mod's files win whenever multiple mods
//! supply the same target file. It supports:
//!
//! - **Lazy discovery**: folder nodes and mod entities are created the first
//!   time a scan finds them and garbage-collected after they disappear
//! - **Mark-and-sweep change detection**: repeated scans surface adds,
//!   updates, and removals as per-node statuses
//! - **Deterministic conflict resolution**: ordered priority with discovery
//!   order breaking ties
//! - **Two-phase commit**: all uninstalls before all installs within a
//!   folder, so removals never race the replacement files of another mod
//!
//! Physical file installation is not this crate's business — it lives behind
//! the [`ModEntity`] trait, supplied by the host through a [`ModFactory`].
//!
//! # Example
//!
//! ```no_run
//! use overmod_tree::{FolderTree, ModEntity, ModFactory};
//! use camino::Utf8Path;
//!
//! struct MyFactory;
//!
//! impl ModFactory for MyFactory {
//!     fn create(&mut self, path: &Utf8Path, name: &str) -> Box<dyn ModEntity> {
//!         // hand back whatever installs this mod's files
//!         # unimplemented!()
//!     }
//! }
//!
//! let mut tree = FolderTree::new("/games/host/mods", Box::new(MyFactory));
//! tree.scan();
//! tree.update();
//! ```
//!
//! The tree is single-threaded and synchronous: callers serialize all
//! operations.

pub mod config;
pub mod entity;
pub mod error;
pub mod glob;
pub mod policy;
pub mod status;
pub mod tree;
pub mod util;

// Re-export main types
pub use config::{FolderConfig, CONFIG_FILE_NAME};
pub use entity::{ModEntity, ModFactory};
pub use error::{Error, Result};
pub use glob::NameGlob;
pub use policy::{FolderPolicy, DEFAULT_PRIORITY, IGNORED_PRIORITY};
pub use status::Status;
pub use tree::{FolderId, FolderTree};
