//! Per-folder inclusion/exclusion/priority policy.
//!
//! A mod's "ignored" state and its priority share one ordered domain:
//! priority `0` is a reserved sentinel meaning "do not install", distinct
//! from absence in the map (which falls back to [`DEFAULT_PRIORITY`]).
//!
//! The policy layer never consults ancestors — [`is_ignored`](FolderPolicy::is_ignored)
//! is strictly local. File exclusion *is* inherited, but the ancestry walk
//! lives on the tree where parent links are reachable; this type only
//! answers for its own patterns via
//! [`is_file_ignored_here`](FolderPolicy::is_file_ignored_here).

use crate::config::FolderConfig;
use crate::glob::NameGlob;
use std::collections::{BTreeSet, HashMap};

/// Priority assigned to mods with no explicit `[Priority]` entry.
pub const DEFAULT_PRIORITY: i32 = 50;

/// Priority value reserved to mean "ignored".
pub const IGNORED_PRIORITY: i32 = 0;

/// Policy state for one folder node. All names and glob fragments are
/// expected in normalized form.
#[derive(Debug, Default)]
pub struct FolderPolicy {
    ignore_all: bool,
    exclude_all: bool,
    force_exclude: bool,
    priorities: HashMap<String, i32>,
    include_mods: BTreeSet<String>,
    exclude_files: BTreeSet<String>,
    // Compiled caches, rebuilt eagerly on every mutation of the backing set.
    include_glob: NameGlob,
    exclude_glob: NameGlob,
}

impl FolderPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the mod `name` should be skipped by this folder's scan.
    ///
    /// Under `exclude_all`/`force_exclude` a name survives only by matching
    /// the include list; otherwise only an explicit priority of `0` ignores
    /// it. Ancestors are not consulted.
    pub fn is_ignored(&self, name: &str) -> bool {
        if self.exclude_all || self.force_exclude {
            !self.include_glob.is_match(name)
        } else {
            self.priorities.get(name) == Some(&IGNORED_PRIORITY)
        }
    }

    /// Whether `name` matches this folder's own file exclusion patterns.
    pub fn is_file_ignored_here(&self, name: &str) -> bool {
        self.exclude_glob.is_match(name)
    }

    /// Configured priority for `name`, or [`DEFAULT_PRIORITY`] if absent.
    pub fn priority_of(&self, name: &str) -> i32 {
        self.priorities
            .get(name)
            .copied()
            .unwrap_or(DEFAULT_PRIORITY)
    }

    /// Set the priority for mods named `name`. `0` marks the name ignored.
    pub fn set_priority(&mut self, name: impl Into<String>, priority: i32) {
        self.priorities.insert(name.into(), priority);
    }

    /// Add `name` to the inclusion list, allowing it even under exclude-all.
    pub fn include(&mut self, name: impl Into<String>) {
        self.include_mods.insert(name.into());
        self.rebuild_include_glob();
    }

    /// Add a file glob fragment to the exclusion patterns.
    pub fn exclude_file_glob(&mut self, glob: impl Into<String>) {
        self.exclude_files.insert(glob.into());
        self.rebuild_exclude_glob();
    }

    pub fn set_ignore_all(&mut self, value: bool) {
        self.ignore_all = value;
    }

    pub fn set_exclude_all(&mut self, value: bool) {
        self.exclude_all = value;
    }

    pub fn set_force_exclude(&mut self, value: bool) {
        self.force_exclude = value;
    }

    pub fn ignore_all(&self) -> bool {
        self.ignore_all
    }

    /// Apply the four sections of a loaded folder configuration.
    pub fn apply_config(&mut self, config: &FolderConfig) {
        self.set_ignore_all(config.ignore_all_files);
        self.set_exclude_all(config.exclude_all_mods);

        for (name, priority) in &config.priorities {
            self.set_priority(name.clone(), *priority);
        }
        for glob in &config.exclude_files {
            self.exclude_files.insert(glob.clone());
        }
        for name in &config.include_mods {
            self.include_mods.insert(name.clone());
        }
        self.rebuild_exclude_glob();
        self.rebuild_include_glob();
    }

    /// Reset every policy table and both compiled caches.
    pub fn clear(&mut self) {
        self.priorities.clear();
        self.include_mods.clear();
        self.exclude_files.clear();
        self.rebuild_include_glob();
        self.rebuild_exclude_glob();
    }

    fn rebuild_include_glob(&mut self) {
        self.include_glob = NameGlob::compile(self.include_mods.iter().map(String::as_str));
    }

    fn rebuild_exclude_glob(&mut self) {
        self.exclude_glob = NameGlob::compile(self.exclude_files.iter().map(String::as_str));
    }
}
