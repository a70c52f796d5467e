//! Fault types raised while a packet is being dissected.
//!
//! # Fault Classes
//!
//! - [`BoundsError::Reported`]: a read ran past the length the packet declared. The packet is
//!   malformed but the record boundary is known, so dissection recovers.
//! - [`BoundsError::Captured`]: a read ran past the captured bytes while staying inside the
//!   declared length. The capture was cut short; the packet is abandoned.
//! - [`BoundsError::Fragment`]: a read ran past the end of an incomplete reassembly fragment. The
//!   packet is abandoned.
//! - [`DissectError::Malformed`] and [`DissectError::DepthExceeded`] are recoverable.
//! - [`DissectError::Bug`] flags a contract violation found during dispatch and abandons the
//!   packet.

use std::fmt;

use thiserror::Error;

use super::FaultPolicy;
use crate::error::RegistryError;

/// Out-of-range access on a [`Tvb`](crate::tvb::Tvb).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BoundsError {
    /// The read ends beyond the reported length.
    #[error("read of {len} bytes at offset {offset} exceeds reported length {reported}")]
    Reported {
        /// Start of the read.
        offset: usize,
        /// Requested length.
        len: usize,
        /// Reported length of the view.
        reported: usize,
    },

    /// The read ends beyond the captured bytes but inside the reported length.
    #[error("read of {len} bytes at offset {offset} exceeds captured length {captured}")]
    Captured {
        /// Start of the read.
        offset: usize,
        /// Requested length.
        len: usize,
        /// Captured length of the view.
        captured: usize,
    },

    /// The read ends beyond the bytes available in a fragment.
    #[error("read of {len} bytes at offset {offset} runs past a {available} byte fragment")]
    Fragment {
        /// Start of the read.
        offset: usize,
        /// Requested length.
        len: usize,
        /// Bytes available in the fragment.
        available: usize,
    },
}

/// Error returned by a dissector invocation.
///
/// # Examples
///
/// ```
/// use dissect_core::fault::{BoundsError, DissectError, FaultPolicy};
///
/// let err = DissectError::from(BoundsError::Reported {
///     offset: 8,
///     len: 4,
///     reported: 10,
/// });
/// assert_eq!(err.default_fault_policy(), FaultPolicy::Recover);
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DissectError {
    /// A byte accessor went out of range.
    #[error("bounds fault: {0}")]
    Bounds(#[from] BoundsError),

    /// The dissector found the data inconsistent with its protocol.
    #[error("malformed packet: {0}")]
    Malformed(String),

    /// Protocols nested deeper than the configured limit.
    #[error("dissection nested deeper than {max} layers")]
    DepthExceeded {
        /// Configured maximum depth.
        max: usize,
    },

    /// Dispatch was asked to do something the registry cannot honour.
    #[error("dissector bug: {0}")]
    Bug(String),

    /// A fault already abandoned by the invocation that raised it, on its
    /// way to the top of the packet. Renders as the underlying fault.
    #[error("{0}")]
    Abandoned(AbandonedFault),
}

/// An abandoned fault tagged with the identity the packet context assigned
/// to it.
///
/// Outer invocations pass a fault carrying the identity they are waiting for
/// straight through. A decoder that swallows it and then raises anything
/// else, even an equal fault of its own, gets that new fault adjudicated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbandonedFault {
    id: u64,
    fault: Box<DissectError>,
}

impl AbandonedFault {
    pub(crate) fn new(id: u64, fault: DissectError) -> Self {
        Self {
            id,
            fault: Box::new(fault),
        }
    }

    /// Identity assigned when the fault was abandoned.
    #[must_use]
    pub fn id(&self) -> u64 { self.id }

    /// The fault as the dissector raised it.
    #[must_use]
    pub fn fault(&self) -> &DissectError { &self.fault }
}

impl fmt::Display for AbandonedFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(&self.fault, f) }
}

impl From<RegistryError> for DissectError {
    fn from(error: RegistryError) -> Self { Self::Bug(error.to_string()) }
}

impl DissectError {
    /// Build a [`DissectError::Malformed`] from a reason.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self { Self::Malformed(reason.into()) }

    /// Build a [`DissectError::Bug`] from a description.
    #[must_use]
    pub fn bug(description: impl Into<String>) -> Self { Self::Bug(description.into()) }

    /// Returns the policy applied when no hook overrides it.
    ///
    /// | Error | Policy |
    /// |-------|--------|
    /// | `Bounds::Reported` | `Recover` |
    /// | `Malformed` | `Recover` |
    /// | `DepthExceeded` | `Recover` |
    /// | `Bounds::Captured` | `Abandon` |
    /// | `Bounds::Fragment` | `Abandon` |
    /// | `Bug` | `Abandon` |
    /// | `Abandoned` | `Abandon` |
    #[must_use]
    pub fn default_fault_policy(&self) -> FaultPolicy {
        match self {
            Self::Bounds(BoundsError::Reported { .. })
            | Self::Malformed(_)
            | Self::DepthExceeded { .. } => FaultPolicy::Recover,
            Self::Bounds(BoundsError::Captured { .. } | BoundsError::Fragment { .. })
            | Self::Bug(_)
            | Self::Abandoned(_) => FaultPolicy::Abandon,
        }
    }

    /// The fault as a dissector raised it, looking through
    /// [`DissectError::Abandoned`].
    #[must_use]
    pub fn root_cause(&self) -> &DissectError {
        match self {
            Self::Abandoned(abandoned) => abandoned.fault().root_cause(),
            other => other,
        }
    }

    /// Returns true if the default policy recovers from this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool { self.default_fault_policy() == FaultPolicy::Recover }
}
