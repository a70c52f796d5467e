//! Policies applied when a dissector faults.

/// How the dispatch engine treats a faulted invocation.
///
/// [`DissectError::default_fault_policy`](crate::fault::DissectError::default_fault_policy)
/// returns the built-in choice for each error; a
/// [`FaultPolicyHook`](crate::fault::FaultPolicyHook) may override it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Keep what was produced, mark the rest of the view as malformed, and
    /// report the invocation as having consumed the whole view.
    ///
    /// The calling dissector continues with its remaining work.
    #[default]
    Recover,

    /// Unwind to the top-level entry point and abandon the packet.
    ///
    /// Every intervening invocation restores its saved packet state on the
    /// way out. The packet keeps whatever structure was produced before the
    /// fault and is flagged as malformed.
    Abandon,
}

impl FaultPolicy {
    /// Returns the policy name as a static string for metrics and logging.
    ///
    /// ```
    /// use dissect_core::fault::FaultPolicy;
    ///
    /// assert_eq!(FaultPolicy::Recover.as_str(), "recover");
    /// assert_eq!(FaultPolicy::Abandon.as_str(), "abandon");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recover => "recover",
            Self::Abandon => "abandon",
        }
    }
}
