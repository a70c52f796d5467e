//! Registry-wide settings.

use serde::{Deserialize, Serialize};

/// Configuration for registration checks and fault handling.
///
/// Missing fields take their defaults when deserialized, so a front end can
/// persist only what the user changed.
///
/// # Examples
///
/// ```
/// use dissect_core::config::DissectConfig;
///
/// let config = DissectConfig::default()
///     .strict_registration(true)
///     .max_depth(16)
///     .fallback_dissector("data");
///
/// assert_eq!(config.max_depth, 16);
/// assert_eq!(config.fallback_dissector.as_deref(), Some("data"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DissectConfig {
    /// Panic on registration contract violations instead of returning an
    /// error.
    ///
    /// Default: false.
    pub strict_registration: bool,

    /// Maximum nesting of dissector invocations for one packet.
    ///
    /// Default: 64.
    pub max_depth: usize,

    /// Whether to log recovered faults at warn level.
    ///
    /// Default: true.
    pub log_recovered_faults: bool,

    /// Name of the registered dissector that receives data every other
    /// dissector rejected.
    ///
    /// Default: none.
    pub fallback_dissector: Option<String>,
}

impl Default for DissectConfig {
    fn default() -> Self {
        Self {
            strict_registration: false,
            max_depth: 64,
            log_recovered_faults: true,
            fallback_dissector: None,
        }
    }
}

impl DissectConfig {
    /// Set whether registration violations panic.
    #[must_use]
    pub fn strict_registration(mut self, enabled: bool) -> Self {
        self.strict_registration = enabled;
        self
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set whether to log recovered faults.
    #[must_use]
    pub fn log_recovered_faults(mut self, enabled: bool) -> Self {
        self.log_recovered_faults = enabled;
        self
    }

    /// Name the dissector used when every other dissector rejected the data.
    #[must_use]
    pub fn fallback_dissector(mut self, name: impl Into<String>) -> Self {
        self.fallback_dissector = Some(name.into());
        self
    }
}
