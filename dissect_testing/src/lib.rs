//! Test support for crates built on [`dissect_core`].
//!
//! Provides canned dissectors that record their invocations in a shared
//! [`CallLog`], and a serialised handle to the global `logtest` logger.
//!
//! ```rust
//! use dissect_core::{Registry, Tvb};
//! use dissect_testing::{CallLog, accepting};
//!
//! let log = CallLog::default();
//! let mut registry = Registry::new();
//! let root = registry
//!     .register_dissector("root", None, accepting(log.clone(), "root"))
//!     .unwrap();
//! let packet = registry.dissect(&root, 1, Tvb::from_static(b"abc"));
//! assert!(!packet.status.is_abandoned());
//! assert_eq!(log.calls(), ["root"]);
//! ```

mod dissectors;
mod logging;

pub use dissectors::{CallLog, accepting, consuming, delegating, faulting, panicking, rejecting};
pub use logging::{LoggerHandle, logger};
