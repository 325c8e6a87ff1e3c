//! The folder tree: scan, two-phase update, garbage collection.
//!
//! A [`FolderTree`] owns every [`FolderNode`] in an arena keyed by
//! [`FolderId`]. Parent links are plain ids — relation only, never a second
//! ownership path. A scan-then-update cycle looks like:
//!
//! 1. [`scan`](FolderTree::scan) walks the directory hierarchy top-down,
//!    discovering mods and folders lazily, pre-marking known mods `Removed`
//!    and sweeping them back in as the walk re-finds them. Status aggregates
//!    bottom-up: any changed mod or child elevates its folder.
//! 2. [`update`](FolderTree::update) applies the scan result: per folder,
//!    every direct mod is uninstalled in ascending priority order, then
//!    installed in the same order, so the highest-priority mod's files are
//!    the last writer for any contested target. Children recurse, removed
//!    entries are garbage-collected, and statuses reset to `Unchanged`.
//!
//! The tree is single-threaded and synchronous; callers serialize all
//! operations. Mutation is append-only during scan and prune-only during
//! update's collection step — the two never interleave within one node.

use crate::config::{FolderConfig, CONFIG_FILE_NAME};
use crate::entity::{ModEntity, ModFactory};
use crate::policy::FolderPolicy;
use crate::status::Status;
use crate::util::normalize_name;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::{BTreeMap, HashMap};

/// Opaque handle to a folder node inside a [`FolderTree`].
///
/// Handles become stale once the node is garbage-collected; accessors return
/// `None` (or report nothing to do) for stale ids rather than panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(u64);

/// A tracked mod and the normalized name it was discovered under.
struct ModSlot {
    name: String,
    entity: Box<dyn ModEntity>,
}

/// One folder of the mod hierarchy.
///
/// Everything here is reached through the owning [`FolderTree`]; the node
/// itself carries no arena access.
struct FolderNode {
    path: Utf8PathBuf,
    parent: Option<FolderId>,
    /// Normalized child-folder name -> child id.
    children: BTreeMap<String, FolderId>,
    /// Discovery order is preserved: it breaks priority ties during update.
    mods: Vec<ModSlot>,
    policy: FolderPolicy,
    /// One-shot guard: the folder's own config file is read at most once.
    config_loaded: bool,
    status: Status,
}

impl FolderNode {
    fn new(path: Utf8PathBuf, parent: Option<FolderId>) -> Self {
        Self {
            path,
            parent,
            children: BTreeMap::new(),
            mods: Vec::new(),
            policy: FolderPolicy::new(),
            config_loaded: false,
            status: Status::Unchanged,
        }
    }
}

/// The tree root and driver: owns the arena, the mod factory, and the
/// scan/update cycle.
pub struct FolderTree {
    nodes: HashMap<FolderId, FolderNode>,
    next_id: u64,
    root: FolderId,
    factory: Box<dyn ModFactory>,
}

impl FolderTree {
    /// Create a tree rooted at `root_path`. Mods discovered during scans are
    /// materialized through `factory`.
    pub fn new(root_path: impl Into<Utf8PathBuf>, factory: Box<dyn ModFactory>) -> Self {
        let root = FolderId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, FolderNode::new(root_path.into(), None));

        Self {
            nodes,
            next_id: 1,
            root,
            factory,
        }
    }

    /// Handle of the root folder.
    pub fn root(&self) -> FolderId {
        self.root
    }

    /// Add (or find) the child folder `name` directly beneath `parent`.
    ///
    /// Returns `None` if `parent` is stale.
    pub fn add_child(&mut self, parent: FolderId, name: &str) -> Option<FolderId> {
        let key = normalize_name(name);
        let parent_node = self.nodes.get(&parent)?;

        if let Some(existing) = parent_node.children.get(&key) {
            return Some(*existing);
        }

        let path = parent_node.path.join(name);
        let id = FolderId(self.next_id);
        self.next_id += 1;

        self.nodes.insert(id, FolderNode::new(path, Some(parent)));
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.insert(key, id);
        }
        Some(id)
    }

    /// Scan the whole tree, starting at the root.
    pub fn scan(&mut self) {
        self.scan_folder(self.root);
    }

    /// Apply the most recent scan to the whole tree.
    pub fn update(&mut self) {
        let root = self.root;
        self.update_folder(root);
    }

    /// Reconcile one folder's on-disk state into the tree.
    ///
    /// Discovers mods and re-scans known ones, aggregates this folder's
    /// status, and recurses into child folders. Does not touch installed
    /// files. A folder whose status resolves to `Removed` prunes its
    /// children for this cycle.
    pub fn scan_folder(&mut self, id: FolderId) {
        if self.scan_local(id) {
            return;
        }

        let child_ids: Vec<FolderId> = match self.nodes.get(&id) {
            Some(node) => node.children.values().copied().collect(),
            None => return,
        };

        for child in child_ids {
            self.scan_folder(child);

            let child_changed = self
                .nodes
                .get(&child)
                .is_some_and(|n| n.status != Status::Unchanged);
            if child_changed {
                if let Some(node) = self.nodes.get_mut(&id) {
                    if node.status == Status::Unchanged {
                        node.status = Status::Updated;
                    }
                }
            }
        }
    }

    /// Scan one folder's direct mods and derive its own status.
    /// Returns `true` when the caller must not recurse into children
    /// (folder removed, or stale id).
    fn scan_local(&mut self, id: FolderId) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return true;
        };
        let path = node.path.clone();
        tracing::info!("Scanning mods at '{}'", path);

        if !node.config_loaded {
            node.config_loaded = true;
            if let Some(config) = FolderConfig::load(&path.join(CONFIG_FILE_NAME)) {
                node.policy.apply_config(&config);
            }
        }

        // Mark phase: presume every tracked mod gone until the walk re-finds it.
        for slot in &mut node.mods {
            slot.entity.set_status(Status::Removed);
        }

        let mut fine = true;
        if !node.policy.ignore_all() {
            match std::fs::read_dir(path.as_std_path()) {
                Ok(entries) => {
                    for entry in entries {
                        let entry = match entry {
                            Ok(entry) => entry,
                            Err(e) => {
                                tracing::warn!("Bad directory entry under '{}': {}", path, e);
                                continue;
                            }
                        };
                        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                        if !is_dir {
                            continue;
                        }
                        let file_name = entry.file_name();
                        let Some(name) = file_name.to_str() else {
                            tracing::warn!("Skipping non-UTF-8 entry under '{}'", path);
                            continue;
                        };

                        let key = normalize_name(name);
                        if node.policy.is_ignored(&key) {
                            tracing::info!("Ignoring mod at '{}'", path.join(name));
                            continue;
                        }

                        let priority = node.policy.priority_of(&key);
                        match node.mods.iter().position(|slot| slot.name == key) {
                            Some(i) => {
                                let slot = &mut node.mods[i];
                                slot.entity.set_priority(priority);
                                slot.entity.scan();
                            }
                            None => {
                                let mod_path = path.join(name);
                                tracing::debug!("Discovered mod '{}' at '{}'", key, mod_path);

                                let mut entity = self.factory.create(&mod_path, &key);
                                entity.set_status(Status::Added);
                                entity.set_priority(priority);
                                entity.scan();
                                node.mods.push(ModSlot { name: key, entity });
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to enumerate '{}': {}", path, e);
                    fine = false;
                }
            }
        }

        // Aggregate: a failed walk removes the folder; any changed mod
        // elevates it. Severity only ever moves up within one pass.
        if !fine {
            node.status = Status::Removed;
        } else if node
            .mods
            .iter()
            .any(|slot| slot.entity.status() != Status::Unchanged)
            && node.status < Status::Updated
        {
            node.status = Status::Updated;
        }

        node.status == Status::Removed
    }

    /// Apply the result of the most recent scan to this folder's subtree.
    ///
    /// No-op when the folder is `Unchanged`. Otherwise runs the two-phase
    /// protocol over the folder's direct mods, recurses into children
    /// (tearing down removed ones), garbage-collects removed entries, and
    /// resets the folder to `Unchanged`.
    pub fn update_folder(&mut self, id: FolderId) {
        {
            let Some(node) = self.nodes.get_mut(&id) else {
                return;
            };
            if !node.status.needs_update() {
                return;
            }
            tracing::info!("Updating mods for '{}'", node.path);

            let order = update_order(&node.mods);

            // Phase 1: every mod retracts its stale files before any new
            // file lands, so a lower-priority copy can never outlive the
            // higher-priority replacement for the same target.
            for &i in &order {
                let slot = &mut node.mods[i];
                if let Err(e) = slot.entity.uninstall() {
                    tracing::warn!("Failed to uninstall mod '{}': {}", slot.name, e);
                }
            }

            // Phase 2: install in the same ascending order; the last writer
            // for a contested file is the highest-priority mod. Removed mods
            // got their teardown in phase 1 and keep their status for the
            // sweep below.
            for &i in &order {
                let slot = &mut node.mods[i];
                if slot.entity.status() == Status::Removed {
                    continue;
                }
                if let Err(e) = slot.entity.install() {
                    tracing::warn!("Failed to install mod '{}': {}", slot.name, e);
                }
                slot.entity.mark_unchanged();
            }
        }

        let child_ids: Vec<FolderId> = match self.nodes.get(&id) {
            Some(node) => node.children.values().copied().collect(),
            None => return,
        };
        for child in child_ids {
            let child_removed = self
                .nodes
                .get(&child)
                .is_some_and(|n| n.status == Status::Removed);
            if child_removed {
                self.teardown_folder(child);
            } else {
                self.update_folder(child);
            }
        }

        self.sweep(id);
    }

    /// Update the folder that owns the named mod.
    ///
    /// A per-mod update is never scoped to that single mod: priority
    /// resolution is a whole-folder property, so this delegates to
    /// [`update_folder`](Self::update_folder) on the owning folder. Does
    /// nothing when the mod is not tracked under `id`.
    pub fn update_mod(&mut self, id: FolderId, name: &str) {
        let key = normalize_name(name);
        let tracked = self
            .nodes
            .get(&id)
            .is_some_and(|n| n.mods.iter().any(|slot| slot.name == key));

        if tracked {
            self.update_folder(id);
        } else {
            tracing::debug!("No tracked mod '{}' under folder {:?}", key, id);
        }
    }

    /// Garbage collection: drop removed mods and child entries whose
    /// subtree was torn down, then settle the folder.
    fn sweep(&mut self, id: FolderId) {
        let stale_children: Vec<String> = match self.nodes.get(&id) {
            Some(node) => node
                .children
                .iter()
                .filter(|(_, child)| !self.nodes.contains_key(child))
                .map(|(name, _)| name.clone())
                .collect(),
            None => return,
        };

        if let Some(node) = self.nodes.get_mut(&id) {
            node.mods
                .retain(|slot| slot.entity.status() != Status::Removed);
            for name in &stale_children {
                node.children.remove(name);
            }
            node.status = Status::Unchanged;
        }
    }

    /// Uninstall a removed folder's mods (ascending priority, recursing into
    /// its children) and release its whole subtree from the arena. The
    /// parent's sweep drops the dangling child entry afterwards.
    fn teardown_folder(&mut self, id: FolderId) {
        let Some(mut node) = self.nodes.remove(&id) else {
            return;
        };
        tracing::info!("Tearing down removed folder '{}'", node.path);

        for &i in &update_order(&node.mods) {
            let slot = &mut node.mods[i];
            if let Err(e) = slot.entity.uninstall() {
                tracing::warn!("Failed to uninstall mod '{}': {}", slot.name, e);
            }
        }

        for child in node.children.values().copied() {
            self.teardown_folder(child);
        }
    }

    /// Reset one folder: forget its policy, its tracked mods, and its whole
    /// child subtree. The folder itself stays in the tree.
    pub fn clear(&mut self, id: FolderId) {
        let child_ids: Vec<FolderId> = match self.nodes.get(&id) {
            Some(node) => node.children.values().copied().collect(),
            None => return,
        };
        for child in child_ids {
            self.remove_subtree(child);
        }

        if let Some(node) = self.nodes.get_mut(&id) {
            node.children.clear();
            node.mods.clear();
            node.policy.clear();
        }
    }

    fn remove_subtree(&mut self, id: FolderId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        for child in node.children.values().copied() {
            self.remove_subtree(child);
        }
    }

    // ---- read accessors -------------------------------------------------

    /// Current status of a folder, or `None` for a stale handle.
    pub fn status(&self, id: FolderId) -> Option<Status> {
        self.nodes.get(&id).map(|n| n.status)
    }

    /// Filesystem path of a folder.
    pub fn path(&self, id: FolderId) -> Option<&Utf8Path> {
        self.nodes.get(&id).map(|n| n.path.as_path())
    }

    /// All live folder ids, pre-order from the root.
    pub fn folder_ids(&self) -> Vec<FolderId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.values().rev().copied());
        }
        out
    }

    /// Names of a folder's tracked mods, in discovery order.
    pub fn mod_names(&self, id: FolderId) -> Vec<String> {
        self.nodes
            .get(&id)
            .map(|n| n.mods.iter().map(|slot| slot.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Names of a folder's tracked mods in update order: ascending priority,
    /// ties broken by discovery order.
    pub fn mods_by_priority(&self, id: FolderId) -> Vec<String> {
        let Some(node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        update_order(&node.mods)
            .into_iter()
            .map(|i| node.mods[i].name.clone())
            .collect()
    }

    /// Status of one tracked mod.
    pub fn mod_status(&self, id: FolderId, name: &str) -> Option<Status> {
        let key = normalize_name(name);
        self.nodes.get(&id)?.mods.iter().find_map(|slot| {
            (slot.name == key).then(|| slot.entity.status())
        })
    }

    // ---- policy pass-throughs -------------------------------------------
    //
    // Names are normalized here so callers may pass raw directory names.

    /// Whether this folder's own policy ignores the mod `name`.
    pub fn is_ignored(&self, id: FolderId, name: &str) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|n| n.policy.is_ignored(&normalize_name(name)))
    }

    /// Whether `name` is excluded by this folder or any ancestor.
    ///
    /// File exclusion accumulates down the tree: a pattern excluded at an
    /// ancestor is excluded at every descendant. The root answers `false`
    /// when nothing matched.
    pub fn is_file_ignored(&self, id: FolderId, name: &str) -> bool {
        let key = normalize_name(name);
        let mut current = Some(id);

        while let Some(cursor) = current {
            let Some(node) = self.nodes.get(&cursor) else {
                return false;
            };
            if node.policy.is_file_ignored_here(&key) {
                return true;
            }
            current = node.parent;
        }
        false
    }

    /// Configured priority of `name` in this folder, or the default.
    pub fn priority_of(&self, id: FolderId, name: &str) -> i32 {
        self.nodes
            .get(&id)
            .map(|n| n.policy.priority_of(&normalize_name(name)))
            .unwrap_or(crate::policy::DEFAULT_PRIORITY)
    }

    /// Set the priority for mods named `name` in this folder.
    pub fn set_priority(&mut self, id: FolderId, name: &str, priority: i32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.policy.set_priority(normalize_name(name), priority);
        }
    }

    /// Allow `name` in this folder even under exclude-all.
    pub fn include(&mut self, id: FolderId, name: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.policy.include(normalize_name(name));
        }
    }

    /// Exclude files matching `glob` in this folder and all descendants.
    pub fn exclude_file_glob(&mut self, id: FolderId, glob: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.policy.exclude_file_glob(normalize_name(glob));
        }
    }

    pub fn set_ignore_all(&mut self, id: FolderId, value: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.policy.set_ignore_all(value);
        }
    }

    pub fn set_exclude_all(&mut self, id: FolderId, value: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.policy.set_exclude_all(value);
        }
    }

    pub fn set_force_exclude(&mut self, id: FolderId, value: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.policy.set_force_exclude(value);
        }
    }
}

/// Indices of `mods` in update order: ascending priority, stable, so the
/// first-discovered mod wins among equals and the highest-priority mod is
/// processed last in both phases.
fn update_order(mods: &[ModSlot]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..mods.len()).collect();
    order.sort_by_key(|&i| mods[i].entity.priority());
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::policy::DEFAULT_PRIORITY;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::fs;
    use std::rc::Rc;
    use tempfile::tempdir;

    type EventLog = Rc<RefCell<Vec<String>>>;
    type NameSet = Rc<RefCell<HashSet<String>>>;

    fn init_tracing() {
        use tracing_subscriber::EnvFilter;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    /// Records install/uninstall calls into a shared log. `scan()` reports
    /// `Updated` for names in the shared dirty set, otherwise settles a
    /// rediscovered mod back to `Unchanged` and leaves a fresh `Added` alone.
    /// Names in the failing set refuse to install.
    struct TestMod {
        name: String,
        status: Status,
        priority: i32,
        events: EventLog,
        dirty: NameSet,
        failing: NameSet,
    }

    impl ModEntity for TestMod {
        fn status(&self) -> Status {
            self.status
        }
        fn set_status(&mut self, status: Status) {
            self.status = status;
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn set_priority(&mut self, priority: i32) {
            self.priority = priority;
        }
        fn scan(&mut self) {
            if self.dirty.borrow().contains(&self.name) {
                self.status = Status::Updated;
            } else if self.status == Status::Removed {
                self.status = Status::Unchanged;
            }
        }
        fn uninstall(&mut self) -> Result<()> {
            self.events.borrow_mut().push(format!("{}.uninstall", self.name));
            Ok(())
        }
        fn install(&mut self) -> Result<()> {
            if self.failing.borrow().contains(&self.name) {
                return Err(crate::Error::Install(format!("{} refuses to install", self.name)));
            }
            self.events.borrow_mut().push(format!("{}.install", self.name));
            Ok(())
        }
    }

    struct TestFactory {
        events: EventLog,
        dirty: NameSet,
        failing: NameSet,
        created: EventLog,
    }

    impl ModFactory for TestFactory {
        fn create(&mut self, _path: &Utf8Path, name: &str) -> Box<dyn ModEntity> {
            self.created.borrow_mut().push(name.to_string());
            Box::new(TestMod {
                name: name.to_string(),
                status: Status::Unchanged,
                priority: DEFAULT_PRIORITY,
                events: Rc::clone(&self.events),
                dirty: Rc::clone(&self.dirty),
                failing: Rc::clone(&self.failing),
            })
        }
    }

    struct Fixture {
        tree: FolderTree,
        events: EventLog,
        dirty: NameSet,
        failing: NameSet,
        created: EventLog,
    }

    fn fixture(root: &std::path::Path) -> Fixture {
        init_tracing();
        let events: EventLog = Rc::default();
        let dirty: NameSet = Rc::default();
        let failing: NameSet = Rc::default();
        let created: EventLog = Rc::default();

        let factory = TestFactory {
            events: Rc::clone(&events),
            dirty: Rc::clone(&dirty),
            failing: Rc::clone(&failing),
            created: Rc::clone(&created),
        };
        let root = Utf8Path::from_path(root).unwrap().to_path_buf();
        Fixture {
            tree: FolderTree::new(root, Box::new(factory)),
            events,
            dirty,
            failing,
            created,
        }
    }

    fn sorted(mut names: Vec<String>) -> Vec<String> {
        names.sort();
        names
    }

    #[test]
    fn test_scan_discovers_mod_directories_only() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("Alpha")).unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();
        fs::write(dir.path().join("readme.txt"), "not a mod").unwrap();

        let mut f = fixture(dir.path());
        f.tree.scan();

        let root = f.tree.root();
        assert_eq!(
            sorted(f.tree.mod_names(root)),
            vec!["alpha".to_string(), "beta".to_string()]
        );
        // Fresh discoveries elevate the folder.
        assert_eq!(f.tree.status(root), Some(Status::Updated));
    }

    #[test]
    fn test_two_phase_order_and_final_owner() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[Priority]\nalpha = 10\nbeta = 5\n",
        )
        .unwrap();

        let mut f = fixture(dir.path());
        f.tree.scan();
        f.tree.update();

        // All uninstalls strictly before all installs, ascending priority in
        // both phases: alpha (10) installs last and owns contested files.
        assert_eq!(
            *f.events.borrow(),
            vec![
                "beta.uninstall".to_string(),
                "alpha.uninstall".to_string(),
                "beta.install".to_string(),
                "alpha.install".to_string(),
            ]
        );
        assert_eq!(f.tree.status(f.tree.root()), Some(Status::Unchanged));
    }

    #[test]
    fn test_update_mod_applies_whole_owning_folder() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[Priority]\nalpha = 10\nbeta = 5\n",
        )
        .unwrap();

        let mut f = fixture(dir.path());
        f.tree.scan();

        // Updating one mod runs the full two-phase cycle over its folder,
        // sibling included; raw-cased names resolve to the tracked entity.
        let root = f.tree.root();
        f.tree.update_mod(root, "Alpha");

        assert_eq!(
            *f.events.borrow(),
            vec![
                "beta.uninstall".to_string(),
                "alpha.uninstall".to_string(),
                "beta.install".to_string(),
                "alpha.install".to_string(),
            ]
        );
        assert_eq!(f.tree.status(root), Some(Status::Unchanged));
    }

    #[test]
    fn test_update_mod_with_unknown_name_does_nothing() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();

        let mut f = fixture(dir.path());
        f.tree.scan();

        let root = f.tree.root();
        f.tree.update_mod(root, "ghost");

        assert!(f.events.borrow().is_empty());
        // The folder still owes an update for its real mods.
        assert_eq!(f.tree.status(root), Some(Status::Updated));
    }

    #[test]
    fn test_install_failure_does_not_abort_other_mods() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();

        let mut f = fixture(dir.path());
        f.failing.borrow_mut().insert("alpha".to_string());
        f.tree.scan();
        f.tree.update();

        // alpha's install failed (logged, not fatal); beta's still ran and
        // the folder settled.
        let events = f.events.borrow();
        assert!(events.contains(&"beta.install".to_string()));
        assert!(!events.contains(&"alpha.install".to_string()));
        drop(events);
        assert_eq!(f.tree.status(f.tree.root()), Some(Status::Unchanged));
    }

    #[test]
    fn test_config_priority_overrides_preset_value() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "[Priority]\nalpha = 7\n").unwrap();

        let mut f = fixture(dir.path());
        let root = f.tree.root();

        // Priorities are last-writer-wins: the config file loaded by the
        // first scan replaces a value set beforehand through the API.
        f.tree.set_priority(root, "alpha", 80);
        f.tree.scan();
        assert_eq!(f.tree.priority_of(root, "alpha"), 7);

        // And later API writes replace the config's value in turn.
        f.tree.set_priority(root, "alpha", 80);
        assert_eq!(f.tree.priority_of(root, "alpha"), 80);
    }

    #[test]
    fn test_priority_ties_break_by_discovery_order() {
        let dir = tempdir().unwrap();
        let mut f = fixture(dir.path());

        // "zeta" is discovered a scan earlier than "alpha", so it keeps the
        // first slot despite sorting after it alphabetically.
        fs::create_dir(dir.path().join("zeta")).unwrap();
        f.tree.scan();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        f.tree.scan();

        assert_eq!(
            f.tree.mods_by_priority(f.tree.root()),
            vec!["zeta".to_string(), "alpha".to_string()]
        );
    }

    #[test]
    fn test_update_is_idempotent() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();

        let mut f = fixture(dir.path());
        f.tree.scan();
        f.tree.update();

        f.events.borrow_mut().clear();
        f.tree.update();
        assert!(f.events.borrow().is_empty(), "second update must be a no-op");
    }

    #[test]
    fn test_removed_mod_is_marked_then_collected() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();

        let mut f = fixture(dir.path());
        f.tree.scan();
        f.tree.update();

        fs::remove_dir(dir.path().join("beta")).unwrap();
        f.tree.scan();

        let root = f.tree.root();
        assert_eq!(f.tree.mod_status(root, "beta"), Some(Status::Removed));
        assert_eq!(f.tree.status(root), Some(Status::Updated));

        f.events.borrow_mut().clear();
        f.tree.update();

        let events = f.events.borrow();
        assert!(events.contains(&"beta.uninstall".to_string()));
        assert!(!events.contains(&"beta.install".to_string()));
        drop(events);

        assert_eq!(f.tree.mod_names(root), vec!["alpha".to_string()]);
        assert_eq!(f.tree.mod_status(root, "beta"), None);
    }

    #[test]
    fn test_priority_zero_mod_is_never_tracked() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("badmod")).unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "[Priority]\nbadmod = 0\n").unwrap();

        let mut f = fixture(dir.path());
        f.tree.scan();
        f.tree.update();

        let root = f.tree.root();
        assert!(f.tree.mod_names(root).is_empty());
        assert!(f.events.borrow().is_empty());
        assert!(f.created.borrow().is_empty());
    }

    #[test]
    fn test_exclude_all_with_include_list() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("mymod")).unwrap();
        fs::create_dir(dir.path().join("othermod")).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[Config]\nExcludeAllMods = 1\n\n[IncludeMods]\nmymod\n",
        )
        .unwrap();

        let mut f = fixture(dir.path());
        f.tree.scan();

        assert_eq!(f.tree.mod_names(f.tree.root()), vec!["mymod".to_string()]);
    }

    #[test]
    fn test_ignore_all_skips_the_walk() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "[Config]\nIgnoreAllFiles = 1\n").unwrap();

        let mut f = fixture(dir.path());
        f.tree.scan();

        let root = f.tree.root();
        assert!(f.tree.mod_names(root).is_empty());
        assert_eq!(f.tree.status(root), Some(Status::Unchanged));
    }

    #[test]
    fn test_file_exclusion_is_inherited_not_lifted() {
        let dir = tempdir().unwrap();
        let mut f = fixture(dir.path());

        let root = f.tree.root();
        let child = f.tree.add_child(root, "sub").unwrap();
        let grandchild = f.tree.add_child(child, "subsub").unwrap();

        f.tree.exclude_file_glob(root, "*.log");
        f.tree.exclude_file_glob(child, "*.bak");

        // Ancestor patterns apply everywhere beneath.
        assert!(f.tree.is_file_ignored(root, "debug.log"));
        assert!(f.tree.is_file_ignored(child, "debug.log"));
        assert!(f.tree.is_file_ignored(grandchild, "debug.log"));
        assert!(f.tree.is_file_ignored(grandchild, "save.bak"));

        // Descendant patterns never climb upward.
        assert!(!f.tree.is_file_ignored(root, "save.bak"));
    }

    #[test]
    fn test_glob_mutation_is_visible_immediately() {
        let dir = tempdir().unwrap();
        let mut f = fixture(dir.path());
        let root = f.tree.root();

        assert!(!f.tree.is_file_ignored(root, "cars.cfg"));
        f.tree.exclude_file_glob(root, "cars.cfg");
        assert!(f.tree.is_file_ignored(root, "cars.cfg"));
    }

    #[test]
    fn test_missing_folder_is_removed_and_children_pruned() {
        let dir = tempdir().unwrap();
        let mut f = fixture(dir.path());

        let root = f.tree.root();
        let ghost = f.tree.add_child(root, "ghost").unwrap();
        let deep = f.tree.add_child(ghost, "deep").unwrap();

        f.tree.scan();

        // ghost's enumeration failed; deep was pruned, not scanned.
        assert_eq!(f.tree.status(ghost), Some(Status::Removed));
        assert_eq!(f.tree.status(deep), Some(Status::Unchanged));
        assert_eq!(f.tree.status(root), Some(Status::Updated));

        f.tree.update();

        // The whole removed subtree is garbage-collected.
        assert_eq!(f.tree.status(ghost), None);
        assert_eq!(f.tree.status(deep), None);
        assert_eq!(f.tree.folder_ids(), vec![root]);
        assert_eq!(f.tree.status(root), Some(Status::Unchanged));
    }

    #[test]
    fn test_failed_child_does_not_abort_siblings() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("good")).unwrap();
        fs::create_dir(dir.path().join("good").join("alpha")).unwrap();

        let mut f = fixture(dir.path());
        let root = f.tree.root();
        // Root's own walk would also track "good" as a mod; keep the test
        // focused on child folders.
        f.tree.set_ignore_all(root, true);

        let bad = f.tree.add_child(root, "missing").unwrap();
        let good = f.tree.add_child(root, "good").unwrap();

        f.tree.scan();

        assert_eq!(f.tree.status(bad), Some(Status::Removed));
        assert_eq!(f.tree.mod_names(good), vec!["alpha".to_string()]);
    }

    #[test]
    fn test_config_is_loaded_once_per_node() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "[Priority]\nalpha = 7\n").unwrap();

        let mut f = fixture(dir.path());
        f.tree.scan();
        let root = f.tree.root();
        assert_eq!(f.tree.priority_of(root, "alpha"), 7);

        // Rewriting the file between scans has no effect: one-shot guard.
        fs::write(dir.path().join(CONFIG_FILE_NAME), "[Priority]\nalpha = 99\n").unwrap();
        f.tree.scan();
        assert_eq!(f.tree.priority_of(root, "alpha"), 7);
    }

    #[test]
    fn test_updated_mod_elevates_folder_on_rescan() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();

        let mut f = fixture(dir.path());
        f.tree.scan();
        f.tree.update();

        let root = f.tree.root();
        assert_eq!(f.tree.status(root), Some(Status::Unchanged));

        f.dirty.borrow_mut().insert("alpha".to_string());
        f.tree.scan();

        assert_eq!(f.tree.mod_status(root, "alpha"), Some(Status::Updated));
        assert_eq!(f.tree.status(root), Some(Status::Updated));
    }

    #[test]
    fn test_child_change_elevates_unchanged_parent() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::create_dir(dir.path().join("sub").join("alpha")).unwrap();

        let mut f = fixture(dir.path());
        let root = f.tree.root();
        // The child folder is policy-managed, not a mod of the root.
        f.tree.set_ignore_all(root, true);
        let sub = f.tree.add_child(root, "sub").unwrap();

        f.tree.scan();

        assert_eq!(f.tree.status(sub), Some(Status::Updated));
        assert_eq!(f.tree.status(root), Some(Status::Updated));
    }

    #[test]
    fn test_same_name_different_case_is_one_entity() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("MyMod")).unwrap();

        let mut f = fixture(dir.path());
        f.tree.scan();
        f.tree.scan();

        // One creation across both scans; tracked under the normalized name.
        assert_eq!(*f.created.borrow(), vec!["mymod".to_string()]);
        assert_eq!(f.tree.mod_names(f.tree.root()), vec!["mymod".to_string()]);
    }

    #[test]
    fn test_clear_resets_folder_state() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();

        let mut f = fixture(dir.path());
        let root = f.tree.root();
        let sub = f.tree.add_child(root, "sub").unwrap();
        f.tree.set_priority(root, "alpha", 80);
        f.tree.scan();

        f.tree.clear(root);

        assert!(f.tree.mod_names(root).is_empty());
        assert_eq!(f.tree.status(sub), None);
        assert_eq!(f.tree.priority_of(root, "alpha"), DEFAULT_PRIORITY);
    }

    #[test]
    fn test_add_child_is_insert_or_find() {
        let dir = tempdir().unwrap();
        let mut f = fixture(dir.path());
        let root = f.tree.root();

        let first = f.tree.add_child(root, "Sub").unwrap();
        let second = f.tree.add_child(root, "sub").unwrap();
        assert_eq!(first, second);
        assert_eq!(f.tree.folder_ids().len(), 2);
    }
}
