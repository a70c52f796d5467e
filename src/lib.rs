//! Public API for the `dissect_core` library.
//!
//! This crate is the registration and dispatch core of a packet dissection
//! engine. Protocol decoders register [`handle::DissectorHandle`]s with a
//! [`registry::Registry`], bind them into selector-keyed
//! [`table::DissectorTable`]s or heuristic lists, and call back through a
//! [`dispatch::Dispatcher`] to hand data to child protocols. Faults raised by
//! decoders are contained per invocation or per packet; see [`fault`].

pub mod config;
pub mod dependency;
pub mod dispatch;
pub mod error;
pub mod fault;
pub mod handle;
pub mod heuristic;
pub mod metrics;
pub mod packet;
pub mod postdissector;
pub mod protocol;
pub mod registry;
pub mod table;
pub mod tree;
pub mod tvb;

pub use config::DissectConfig;
pub use dispatch::{DissectedPacket, Dispatcher, PacketStatus};
/// Result type alias for registry operations.
pub use error::{RegistryError, Result};
pub use fault::{BoundsError, DissectError, FaultPolicy, FaultPolicyHook};
pub use handle::{DataDissector, DissectResult, Dissector, DissectorData, DissectorHandle, dissector_fn};
pub use metrics::{DISSECTOR_PANICS, FAULTS_TOTAL, PACKETS_DISSECTED};
pub use packet::PacketContext;
pub use protocol::ProtocolId;
pub use registry::Registry;
pub use table::{DissectorTable, Guid, Selector, SelectorKind, StringCase, UintWidth};
pub use tree::ProtoTree;
pub use tvb::Tvb;
