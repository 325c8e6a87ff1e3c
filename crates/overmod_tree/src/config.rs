//! Interpretation of a folder's `overmod.ini`.
//!
//! [`overmod_ini::Document`] models the raw file; this module extracts the
//! four sections the engine cares about. Section and `[Config]` key matching
//! is case-insensitive. Names and glob fragments are normalized here so the
//! policy layer only ever sees normalized keys.

use crate::util::normalize_name;
use camino::Utf8Path;
use overmod_ini::{parse_bool, Document};

/// Name of the per-folder configuration file.
pub const CONFIG_FILE_NAME: &str = "overmod.ini";

/// The four configuration sections of a folder's `overmod.ini`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderConfig {
    /// `[Config] IgnoreAllFiles` — skip the folder's walk entirely.
    pub ignore_all_files: bool,
    /// `[Config] ExcludeAllMods` — exclude every mod not include-listed.
    pub exclude_all_mods: bool,
    /// `[Priority]` — normalized mod name to priority rank.
    pub priorities: Vec<(String, i32)>,
    /// `[ExcludeFiles]` — normalized glob fragments.
    pub exclude_files: Vec<String>,
    /// `[IncludeMods]` — normalized mod names.
    pub include_mods: Vec<String>,
}

impl FolderConfig {
    /// Read a folder configuration from disk.
    ///
    /// Returns `None` (with a log line) when the file is missing or
    /// unreadable; the caller proceeds with default policy.
    pub fn load(path: &Utf8Path) -> Option<Self> {
        match Document::load(path) {
            Ok(doc) => Some(Self::from_document(&doc)),
            Err(e) => {
                if path.as_std_path().exists() {
                    tracing::warn!("Failed to load config file '{}': {}", path, e);
                } else {
                    tracing::debug!("No config file at '{}'", path);
                }
                None
            }
        }
    }

    /// Extract the four well-known sections from a parsed document.
    pub fn from_document(doc: &Document) -> Self {
        let mut config = Self::default();

        if let Some(section) = doc.section("Config") {
            for (key, value) in &section.entries {
                if key.eq_ignore_ascii_case("IgnoreAllFiles") {
                    config.ignore_all_files = parse_bool(value);
                } else if key.eq_ignore_ascii_case("ExcludeAllMods") {
                    config.exclude_all_mods = parse_bool(value);
                }
            }
        }

        if let Some(section) = doc.section("Priority") {
            for (name, value) in &section.entries {
                config
                    .priorities
                    .push((normalize_name(name), parse_priority(name, value)));
            }
        }

        if let Some(section) = doc.section("ExcludeFiles") {
            for (glob, _) in &section.entries {
                config.exclude_files.push(normalize_name(glob));
            }
        }

        if let Some(section) = doc.section("IncludeMods") {
            for (name, _) in &section.entries {
                config.include_mods.push(normalize_name(name));
            }
        }

        config
    }
}

/// Parse a `[Priority]` value. Accepts decimal and `0x` hex. An unparseable
/// value coerces to `0` — the ignored sentinel — with a warning.
fn parse_priority(name: &str, value: &str) -> i32 {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => i32::from_str_radix(hex, 16),
        None => value.parse(),
    };

    parsed.unwrap_or_else(|_| {
        tracing::warn!(
            "Invalid priority '{}' for mod '{}'; treating as 0 (ignored)",
            value,
            name
        );
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_document() {
        let doc = Document::parse(
            "[Config]\nignoreallfiles = 1\nEXCLUDEALLMODS = yes\n\
             [Priority]\nMyMod = 80\nother = 0\n\
             [ExcludeFiles]\n*.LOG\n\
             [IncludeMods]\nMyMod\n",
        );
        let config = FolderConfig::from_document(&doc);

        assert!(config.ignore_all_files);
        assert!(config.exclude_all_mods);
        assert_eq!(
            config.priorities,
            vec![("mymod".into(), 80), ("other".into(), 0)]
        );
        assert_eq!(config.exclude_files, vec!["*.log".to_string()]);
        assert_eq!(config.include_mods, vec!["mymod".to_string()]);
    }

    #[test]
    fn test_missing_sections_yield_defaults() {
        let config = FolderConfig::from_document(&Document::parse(""));
        assert_eq!(config, FolderConfig::default());
    }

    #[test]
    fn test_priority_parsing() {
        assert_eq!(parse_priority("m", "80"), 80);
        assert_eq!(parse_priority("m", "-5"), -5);
        assert_eq!(parse_priority("m", "0x10"), 16);
        assert_eq!(parse_priority("m", "garbage"), 0);
        assert_eq!(parse_priority("m", ""), 0);
    }

    #[test]
    fn test_load_missing_file_returns_none() {
        assert!(FolderConfig::load(Utf8Path::new("/nonexistent/overmod.ini")).is_none());
    }
}
