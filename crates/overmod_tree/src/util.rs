//! Name normalization helpers.

/// Normalize a mod or folder name for use as a tree key.
///
/// Lowercases, converts backslashes to forward slashes, and trims surrounding
/// whitespace and trailing slashes. Idempotent: normalizing a normalized name
/// is a no-op, so two discoveries of the same folder under different casing
/// resolve to the same entity.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .trim_end_matches(['/', '\\'])
        .replace('\\', "/")
        .to_lowercase()
}
