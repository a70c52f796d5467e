//! Fault taxonomy and recovery policies for dissector invocations.
//!
//! Dissectors report rejection with `Ok(0)` and faults with a
//! [`DissectError`]. The dispatch engine turns each fault into a
//! [`FaultPolicy`]:
//!
//! - [`FaultPolicy::Recover`]: keep the partial result, mark the remainder malformed, and let the
//!   caller continue.
//! - [`FaultPolicy::Abandon`]: unwind to the top of the packet, which is recorded as malformed.
//!
//! Applications override the defaults by installing a [`FaultPolicyHook`]
//! with [`Registry::with_fault_hook`](crate::registry::Registry::with_fault_hook).

mod context;
mod error;
mod hook;
mod policy;

pub use context::FaultContext;
pub use error::{AbandonedFault, BoundsError, DissectError};
pub use hook::{DefaultFaultPolicy, FaultPolicyHook};
pub use policy::FaultPolicy;

#[cfg(test)]
mod tests;
