//! Folder configuration file format for the overmod engine.
//!
//! Every mod folder may carry an `overmod.ini` describing local policy. The
//! format is a plain sectioned key/value text file:
//!
//! ```ini
//! [Config]
//! IgnoreAllFiles = 0
//! ExcludeAllMods = 1
//!
//! [Priority]
//! mymod = 80
//!
//! [ExcludeFiles]
//! *.log
//!
//! [IncludeMods]
//! mymod
//! ```
//!
//! This crate only models the document — it knows nothing about what the
//! sections mean. The engine crate interprets the four well-known sections.
//!
//! Parsing is deliberately forgiving: lines that are not a header, an entry,
//! a comment (`;` or `#`) or blank are skipped. A line without `=` becomes an
//! entry with an empty value, which is how name-only sections such as
//! `[IncludeMods]` are written. Duplicate keys are preserved in order; the
//! caller decides the merge rule.

use camino::Utf8Path;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a configuration document.
#[derive(Error, Debug)]
pub enum Error {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One `[Section]` of a document and its entries, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section name as written in the file (brackets stripped, trimmed).
    pub name: String,
    /// `(key, value)` pairs in file order. Value is empty for bare-key lines.
    pub entries: Vec<(String, String)>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }
}

/// A parsed configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    /// Parse a document from text. Never fails; unrecognized lines are skipped.
    pub fn parse(text: &str) -> Self {
        let mut sections: Vec<Section> = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                sections.push(Section::new(name.trim()));
                continue;
            }

            // Entries before the first section header have no home; skip them.
            let Some(section) = sections.last_mut() else {
                continue;
            };

            match line.split_once('=') {
                Some((key, value)) => section
                    .entries
                    .push((key.trim().to_string(), value.trim().to_string())),
                None => section.entries.push((line.to_string(), String::new())),
            }
        }

        Self { sections }
    }

    /// Load and parse a document from a file.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_std_path())?;
        Ok(Self::parse(&text))
    }

    /// Look up a section by name, case-insensitively.
    ///
    /// If the same section appears more than once, the first occurrence wins.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// All sections in file order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}

/// Coerce a boolean-ish config value. Accepts `1`, `true`, `yes`, `on`
/// (case-insensitive); everything else is `false`.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
