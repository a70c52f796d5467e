//! Canonical registration error and result types for the crate.
//!
//! Every variant of [`RegistryError`] describes a defect in decoder setup
//! code rather than a property of captured data. Data-driven failures raised
//! while a packet is being dissected live in [`crate::fault`].

use thiserror::Error;

use crate::{protocol::ProtocolId, table::SelectorKind};

/// Top-level error type for registry setup and maintenance.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// A dissector with the provided name was already registered.
    #[error("dissector `{0}` was already registered")]
    DuplicateDissector(String),
    /// A protocol with the provided filter or short name was already registered.
    #[error("protocol `{0}` was already registered")]
    DuplicateProtocol(String),
    /// Every protocol identifier has been issued.
    #[error("protocol table is full")]
    TooManyProtocols,
    /// A dissector table with the provided name was already registered.
    #[error("dissector table `{0}` was already registered")]
    DuplicateTable(String),
    /// A heuristic list with the provided name was already registered.
    #[error("heuristic list `{0}` was already registered")]
    DuplicateHeuristicList(String),
    /// The heuristic short name is already taken by another entry in any list.
    #[error("heuristic short name `{0}` was already registered")]
    DuplicateHeuristicShortName(String),
    /// The same handle and protocol pair is already present in the list.
    #[error("dissector is already registered in heuristic list `{0}`")]
    DuplicateHeuristicEntry(String),
    /// No dissector table is registered under the name.
    #[error("unknown dissector table `{0}`")]
    UnknownTable(String),
    /// No heuristic list is registered under the name.
    #[error("unknown heuristic list `{0}`")]
    UnknownHeuristicList(String),
    /// No dissector (or heuristic entry) is registered under the name.
    #[error("unknown dissector `{0}`")]
    UnknownDissector(String),
    /// The protocol id was not issued by this registry.
    #[error("unknown protocol {0}")]
    UnknownProtocol(ProtocolId),
    /// A Decode As candidate was offered to a table that does not allow it.
    #[error("dissector table `{0}` does not support Decode As")]
    DecodeAsUnsupported(String),
    /// The selector kind does not match the table's declared kind.
    #[error("dissector table `{table}` is keyed by {expected}, got a {found} selector")]
    SelectorKindMismatch {
        /// Name of the table.
        table: String,
        /// Kind declared when the table was created.
        expected: SelectorKind,
        /// Kind of the offending selector.
        found: &'static str,
    },
    /// An integer selector does not fit the table's key width.
    #[error("selector {value} does not fit the {width}-byte keys of table `{table}`")]
    SelectorOutOfRange {
        /// Name of the table.
        table: String,
        /// Offending selector value.
        value: u32,
        /// Declared key width in bytes.
        width: u8,
    },
}

/// Result type used throughout the registry API.
pub type Result<T> = std::result::Result<T, RegistryError>;
