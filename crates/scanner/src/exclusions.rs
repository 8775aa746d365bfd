use std::path::Path;

/// Prefixes skipped by default: large, slow, or virtual filesystems.
pub const DEFAULT_EXCLUDED_PREFIXES: &[&str] = &["/mnt/c", "/proc", "/dev"];

/// Case-insensitive path prefixes that are never descended into.
///
/// Matching is a plain string prefix test, so `/proc` also covers `/processes`.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    prefixes: Vec<String>,
}

impl ExclusionList {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(|prefix| prefix.as_ref().trim().to_lowercase())
            .filter(|prefix| !prefix.is_empty())
            .collect();
        Self { prefixes }
    }

    pub fn defaults() -> Self {
        Self::new(DEFAULT_EXCLUDED_PREFIXES)
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.prefixes.is_empty() {
            return false;
        }
        let lowered = path.to_string_lossy().to_lowercase();
        self.prefixes
            .iter()
            .any(|prefix| lowered.starts_with(prefix.as_str()))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}
