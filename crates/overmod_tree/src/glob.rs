//! Compiled multi-pattern name matcher.
//!
//! Folder policy keeps two of these caches: one for the mod include list and
//! one for the file exclusion patterns. Both are rebuilt eagerly whenever the
//! backing set changes, so a caller may mutate policy and match immediately
//! without observing a stale compilation.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::fmt;

/// A compiled alternation of glob patterns, matched case-insensitively.
///
/// An empty pattern set never matches anything. Fragments that fail to
/// compile are skipped with a warning rather than poisoning the whole set —
/// folder configuration is user-authored and best-effort.
#[derive(Debug, Clone)]
pub struct NameGlob {
    patterns: Vec<String>,
    set: GlobSet,
}

impl Default for NameGlob {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }
}

impl NameGlob {
    /// Compile a matcher from pattern fragments.
    pub fn compile<'a, I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut patterns = Vec::new();
        let mut builder = GlobSetBuilder::new();

        for fragment in fragments {
            match GlobBuilder::new(fragment).case_insensitive(true).build() {
                Ok(glob) => {
                    builder.add(glob);
                    patterns.push(fragment.to_string());
                }
                Err(e) => tracing::warn!("Skipping invalid glob pattern '{}': {}", fragment, e),
            }
        }

        let set = match builder.build() {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!("Failed to build glob set: {}", e);
                GlobSet::empty()
            }
        };

        Self { patterns, set }
    }

    /// Whether `name` matches any pattern. Empty sets never match.
    pub fn is_match(&self, name: &str) -> bool {
        !self.patterns.is_empty() && self.set.is_match(name)
    }
}

impl fmt::Display for NameGlob {
    /// Semicolon-joined alternation form, mainly for log lines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.patterns.join(";"))
    }
}
