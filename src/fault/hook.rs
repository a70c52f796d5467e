//! Hooks for customising how dissector faults are handled.

use super::{DissectError, FaultContext, FaultPolicy};

/// Hook trait deciding the [`FaultPolicy`] for a faulted invocation.
///
/// The engine consults the hook once per fault, at the invocation that
/// raised it. An abandoned fault is not re-adjudicated by outer invocations
/// while it unwinds.
///
/// # Examples
///
/// ```
/// use dissect_core::fault::{DissectError, FaultContext, FaultPolicy, FaultPolicyHook};
///
/// /// Abandon every malformed packet, useful when fuzzing decoders.
/// struct AbandonAll;
///
/// impl FaultPolicyHook for AbandonAll {
///     fn fault_policy(&self, _error: &DissectError, _ctx: &FaultContext) -> FaultPolicy {
///         FaultPolicy::Abandon
///     }
/// }
/// ```
pub trait FaultPolicyHook: Send + Sync {
    /// Determine the policy for `error`.
    ///
    /// The default delegates to [`DissectError::default_fault_policy`].
    fn fault_policy(&self, error: &DissectError, ctx: &FaultContext) -> FaultPolicy {
        let _ = ctx;
        error.default_fault_policy()
    }

    /// Called after the policy is chosen and before it is applied.
    fn on_fault(&self, _error: &DissectError, _ctx: &FaultContext, _policy: FaultPolicy) {}
}

/// Hook that applies the built-in policies unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFaultPolicy;

impl FaultPolicyHook for DefaultFaultPolicy {}
