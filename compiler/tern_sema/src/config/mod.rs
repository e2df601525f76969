//! Session configuration.

use tern_types::DEFAULT_CACHE_THRESHOLD;

/// Knobs for one compilation session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Entries a derived-type cache map may hold before it is cleared.
    pub cache_threshold: usize,

    /// Warn (`W0001`) when a `match` without `default` leaves options
    /// unhandled.
    pub warn_unhandled_options: bool,

    /// Warn (`W0004`) when a source file name is not snake_case `.tn`.
    pub enforce_file_naming: bool,

    /// Function emitted under its own name instead of a mangled one.
    pub entry_point: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cache_threshold: DEFAULT_CACHE_THRESHOLD,
            warn_unhandled_options: true,
            enforce_file_naming: true,
            entry_point: "main".to_string(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_cache_threshold(mut self, cache_threshold: usize) -> Self {
        self.cache_threshold = cache_threshold;
        self
    }

    #[must_use]
    pub fn with_warn_unhandled_options(mut self, warn: bool) -> Self {
        self.warn_unhandled_options = warn;
        self
    }

    #[must_use]
    pub fn with_enforce_file_naming(mut self, enforce: bool) -> Self {
        self.enforce_file_naming = enforce;
        self
    }

    #[must_use]
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }
}
