//! Ordered heuristic chains tried by content sniffing.
//!
//! Entries are inserted at the front, so the most recently registered entry
//! is tried first. Short names are unique across every list of a registry;
//! [`Registry`](crate::registry::Registry) enforces that before inserting.

use std::sync::Arc;

use crate::{handle::DissectorHandle, protocol::ProtocolId};

/// One candidate in a heuristic list.
#[derive(Clone, Debug)]
pub struct HeuristicEntry {
    handle: DissectorHandle,
    protocol: Option<ProtocolId>,
    short_name: Arc<str>,
    display_name: String,
    enabled: bool,
    enabled_by_default: bool,
}

impl HeuristicEntry {
    pub(crate) fn new(
        handle: DissectorHandle,
        protocol: Option<ProtocolId>,
        short_name: &str,
        display_name: &str,
        enabled_by_default: bool,
    ) -> Self {
        Self {
            handle,
            protocol,
            short_name: Arc::from(short_name),
            display_name: display_name.to_owned(),
            enabled: enabled_by_default,
            enabled_by_default,
        }
    }

    /// Handle invoked when the entry is tried.
    #[must_use]
    pub fn handle(&self) -> &DissectorHandle { &self.handle }

    /// Protocol the entry belongs to.
    #[must_use]
    pub fn protocol(&self) -> Option<ProtocolId> { self.protocol }

    /// Process-wide unique short name.
    #[must_use]
    pub fn short_name(&self) -> &str { &self.short_name }

    /// Name shown to users.
    #[must_use]
    pub fn display_name(&self) -> &str { &self.display_name }

    /// Whether the entry is tried.
    #[must_use]
    pub fn is_enabled(&self) -> bool { self.enabled }

    /// Whether the entry is tried after a reset.
    #[must_use]
    pub fn is_enabled_by_default(&self) -> bool { self.enabled_by_default }

    pub(crate) fn shared_short_name(&self) -> Arc<str> { Arc::clone(&self.short_name) }

    pub(crate) fn set_enabled(&mut self, enabled: bool) { self.enabled = enabled; }

    fn matches(&self, handle: &DissectorHandle, protocol: Option<ProtocolId>) -> bool {
        &self.handle == handle && self.protocol == protocol
    }
}

/// Outcome of a heuristic list that found a taker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeuristicMatch {
    /// Short name of the accepting entry.
    pub short_name: Arc<str>,
    /// Bytes it consumed.
    pub consumed: usize,
}

/// A named, ordered list of heuristic entries.
#[derive(Clone, Debug)]
pub struct HeuristicList {
    name: String,
    protocol: Option<ProtocolId>,
    entries: Vec<HeuristicEntry>,
}

impl HeuristicList {
    pub(crate) fn new(name: &str, protocol: Option<ProtocolId>) -> Self {
        Self {
            name: name.to_owned(),
            protocol,
            entries: Vec::new(),
        }
    }

    /// List name.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Protocol that owns the list.
    #[must_use]
    pub fn protocol(&self) -> Option<ProtocolId> { self.protocol }

    /// Entries in the order they are tried.
    #[must_use]
    pub fn entries(&self) -> &[HeuristicEntry] { &self.entries }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub(crate) fn contains(&self, handle: &DissectorHandle, protocol: Option<ProtocolId>) -> bool {
        self.entries.iter().any(|e| e.matches(handle, protocol))
    }

    pub(crate) fn push_front(&mut self, entry: HeuristicEntry) { self.entries.insert(0, entry); }

    /// Remove the first entry for `handle` and `protocol`.
    pub(crate) fn remove(
        &mut self,
        handle: &DissectorHandle,
        protocol: Option<ProtocolId>,
    ) -> Option<HeuristicEntry> {
        let index = self.entries.iter().position(|e| e.matches(handle, protocol))?;
        Some(self.entries.remove(index))
    }

    /// Remove every entry invoking `handle`, returning their short names.
    pub(crate) fn purge(&mut self, handle: &DissectorHandle) -> Vec<Arc<str>> {
        let mut removed = Vec::new();
        self.entries.retain(|e| {
            if &e.handle == handle {
                removed.push(e.shared_short_name());
                false
            } else {
                true
            }
        });
        removed
    }

    pub(crate) fn entry_mut(&mut self, short_name: &str) -> Option<&mut HeuristicEntry> {
        self.entries.iter_mut().find(|e| e.short_name() == short_name)
    }

    pub(crate) fn reset_enabled(&mut self) {
        for entry in &mut self.entries {
            entry.enabled = entry.enabled_by_default;
        }
    }
}
