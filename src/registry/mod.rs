//! The registry: every handle, table, list, and protocol known to one
//! dissection engine.
//!
//! A [`Registry`] is populated during setup and then shared read-only with
//! the dispatch path. Mutating methods take `&mut self`, so the borrow
//! checker keeps registration and dispatch from interleaving; an embedding
//! application that re-registers at runtime wraps the registry in its own
//! lock.
//!
//! Registration errors are contract violations by setup code. They are
//! logged at error level and returned, or turned into a panic when
//! [`DissectConfig::strict_registration`] is set.

mod decode_as;
mod handles;
mod heuristics;
mod postdissectors;
mod tables;

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

pub use decode_as::DecodeAsEntry;
use log::error;

use crate::{
    config::DissectConfig,
    dependency::DependencyGraph,
    dispatch::Dispatcher,
    error::{RegistryError, Result},
    fault::{DefaultFaultPolicy, FaultPolicyHook},
    handle::DissectorHandle,
    heuristic::HeuristicList,
    postdissector::PostdissectorList,
    protocol::{ProtocolId, ProtocolTable},
    table::DissectorTable,
};

/// Process-wide registry of dissectors and the structures that route to them.
///
/// ```
/// use dissect_core::{
///     handle::DataDissector,
///     registry::Registry,
///     table::{DissectorTable, SelectorKind, UintWidth},
/// };
///
/// let mut registry = Registry::new();
/// let udp = registry
///     .register_protocol("User Datagram Protocol", "UDP", "udp")
///     .expect("register udp");
/// registry
///     .register_table(
///         DissectorTable::new("udp.port", SelectorKind::Uint(UintWidth::U16)).with_protocol(udp),
///     )
///     .expect("register table");
/// let data = registry
///     .register_dissector("data", None, DataDissector)
///     .expect("register data");
/// registry.add("udp.port", 9u16, &data).expect("bind port 9");
///
/// assert_eq!(registry.lookup("udp.port", 9u16), Ok(Some(&data)));
/// ```
pub struct Registry {
    config: DissectConfig,
    fault_hook: Arc<dyn FaultPolicyHook>,
    protocols: ProtocolTable,
    handles: HashMap<String, DissectorHandle>,
    tables: BTreeMap<String, DissectorTable>,
    heuristics: BTreeMap<String, HeuristicList>,
    heuristic_names: HashMap<Arc<str>, String>,
    postdissectors: PostdissectorList,
    dependencies: DependencyGraph,
}

impl Default for Registry {
    fn default() -> Self { Self::with_config(DissectConfig::default()) }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("protocols", &self.protocols.len())
            .field("handles", &self.handles.len())
            .field("tables", &self.tables.len())
            .field("heuristics", &self.heuristics.len())
            .field("postdissectors", &self.postdissectors.len())
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Create an empty registry with default configuration.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create an empty registry with `config`.
    #[must_use]
    pub fn with_config(config: DissectConfig) -> Self {
        Self {
            config,
            fault_hook: Arc::new(DefaultFaultPolicy),
            protocols: ProtocolTable::default(),
            handles: HashMap::new(),
            tables: BTreeMap::new(),
            heuristics: BTreeMap::new(),
            heuristic_names: HashMap::new(),
            postdissectors: PostdissectorList::default(),
            dependencies: DependencyGraph::default(),
        }
    }

    /// Install a hook deciding how dissector faults are handled.
    #[must_use]
    pub fn with_fault_hook(mut self, hook: Arc<dyn FaultPolicyHook>) -> Self {
        self.fault_hook = hook;
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &DissectConfig { &self.config }

    /// Read-only view used to dispatch packets.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher<'_> { Dispatcher::new(self) }

    pub(crate) fn fault_hook(&self) -> &dyn FaultPolicyHook { self.fault_hook.as_ref() }

    /// Register a protocol.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateProtocol`] if the filter or short
    /// name is taken.
    pub fn register_protocol(&mut self, name: &str, short_name: &str, filter_name: &str) -> Result<ProtocolId> {
        let result = self.protocols.register(name, short_name, filter_name);
        let id = self.checked(result)?;
        log::debug!("registered protocol: filter={filter_name}, id={id}");
        Ok(id)
    }

    /// Enable or disable a protocol. Takes effect on the next invocation.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownProtocol`] for an id this registry did
    /// not issue.
    pub fn set_protocol_enabled(&mut self, id: ProtocolId, enabled: bool) -> Result<()> {
        let result = self.protocols.set_enabled(id, enabled);
        self.checked(result)
    }

    /// Disable a protocol now and after every [`reset_protocols`](Self::reset_protocols).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownProtocol`] for an id this registry did
    /// not issue.
    pub fn disable_protocol_by_default(&mut self, id: ProtocolId) -> Result<()> {
        let result = self.protocols.disable_by_default(id);
        self.checked(result)
    }

    /// Restore every protocol's enable switch to its default.
    pub fn reset_protocols(&mut self) { self.protocols.reset_enabled(); }

    /// Whether a protocol is enabled.
    #[must_use]
    pub fn is_protocol_enabled(&self, id: ProtocolId) -> bool { self.protocols.is_enabled(id) }

    /// Look up a protocol by filter name.
    #[must_use]
    pub fn find_protocol(&self, filter_name: &str) -> Option<ProtocolId> { self.protocols.find(filter_name) }

    /// Every registered protocol.
    #[must_use]
    pub fn protocols(&self) -> &ProtocolTable { &self.protocols }

    /// Record that `parent` may hand data to `dependent`.
    pub fn register_dependency(&mut self, parent: &str, dependent: &str) -> bool {
        self.dependencies.register(parent, dependent)
    }

    /// Remove a dependency edge.
    pub fn deregister_dependency(&mut self, parent: &str, dependent: &str) -> bool {
        self.dependencies.deregister(parent, dependent)
    }

    /// The protocol dependency graph.
    #[must_use]
    pub fn dependencies(&self) -> &DependencyGraph { &self.dependencies }

    /// Log a contract violation, then return it or panic in strict mode.
    fn violation<T>(&self, err: RegistryError) -> Result<T> {
        error!("registry contract violation: error={err}");
        assert!(
            !self.config.strict_registration,
            "registry contract violation: {err}"
        );
        Err(err)
    }

    fn checked<T>(&self, result: Result<T>) -> Result<T> { result.or_else(|err| self.violation(err)) }
}
