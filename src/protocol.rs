//! Protocol registrations and their administrative enable switch.
//!
//! Handles, heuristic entries, and tables refer to protocols by
//! [`ProtocolId`]. Whether a protocol is enabled is read on every
//! invocation so toggling takes effect on the next packet.

use std::{collections::HashMap, fmt, sync::Arc};

use serde::Serialize;

use crate::error::{RegistryError, Result};

/// Opaque identifier of a registered protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProtocolId(u32);

impl ProtocolId {
    /// Return the raw index of this protocol.
    #[must_use]
    pub const fn as_u32(self) -> u32 { self.0 }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "proto#{}", self.0) }
}

/// Registration record for a single protocol.
#[derive(Clone, Debug)]
pub struct ProtocolInfo {
    name: String,
    short_name: Arc<str>,
    filter_name: String,
    enabled: bool,
    enabled_by_default: bool,
}

impl ProtocolInfo {
    /// Long, human-readable protocol name.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Short name published as the packet's current protocol.
    #[must_use]
    pub fn short_name(&self) -> &str { &self.short_name }

    /// Unique filter name used for lookups.
    #[must_use]
    pub fn filter_name(&self) -> &str { &self.filter_name }

    /// Whether the protocol is currently enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool { self.enabled }

    /// Whether the protocol is enabled after [`ProtocolTable::reset_enabled`].
    #[must_use]
    pub fn is_enabled_by_default(&self) -> bool { self.enabled_by_default }
}

/// Every protocol known to a registry, indexed by [`ProtocolId`].
#[derive(Debug, Default)]
pub struct ProtocolTable {
    protocols: Vec<ProtocolInfo>,
    by_filter: HashMap<String, ProtocolId>,
}

impl ProtocolTable {
    /// Register a protocol and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateProtocol`] if the filter name or the
    /// short name is already in use, or [`RegistryError::TooManyProtocols`]
    /// once every identifier has been issued.
    pub fn register(&mut self, name: &str, short_name: &str, filter_name: &str) -> Result<ProtocolId> {
        if self.by_filter.contains_key(filter_name) {
            return Err(RegistryError::DuplicateProtocol(filter_name.to_owned()));
        }
        if self.protocols.iter().any(|p| &*p.short_name == short_name) {
            return Err(RegistryError::DuplicateProtocol(short_name.to_owned()));
        }
        let id = next_protocol_id(self.protocols.len())?;
        self.protocols.push(ProtocolInfo {
            name: name.to_owned(),
            short_name: Arc::from(short_name),
            filter_name: filter_name.to_owned(),
            enabled: true,
            enabled_by_default: true,
        });
        self.by_filter.insert(filter_name.to_owned(), id);
        Ok(id)
    }

    /// Look up a protocol by filter name.
    #[must_use]
    pub fn find(&self, filter_name: &str) -> Option<ProtocolId> {
        self.by_filter.get(filter_name).copied()
    }

    /// Borrow the registration record for `id`.
    #[must_use]
    pub fn get(&self, id: ProtocolId) -> Option<&ProtocolInfo> { self.protocols.get(id.0 as usize) }

    /// Shared short name of `id`, if registered.
    #[must_use]
    pub fn short_name(&self, id: ProtocolId) -> Option<Arc<str>> {
        self.get(id).map(|p| Arc::clone(&p.short_name))
    }

    /// Whether `id` is enabled. Unknown ids are reported as disabled.
    #[must_use]
    pub fn is_enabled(&self, id: ProtocolId) -> bool { self.get(id).is_some_and(|p| p.enabled) }

    /// Enable or disable decoding of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownProtocol`] if `id` is not registered.
    pub fn set_enabled(&mut self, id: ProtocolId, enabled: bool) -> Result<()> {
        let info = self.get_mut(id)?;
        info.enabled = enabled;
        Ok(())
    }

    /// Disable `id` now and after every [`reset_enabled`](Self::reset_enabled).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownProtocol`] if `id` is not registered.
    pub fn disable_by_default(&mut self, id: ProtocolId) -> Result<()> {
        let info = self.get_mut(id)?;
        info.enabled = false;
        info.enabled_by_default = false;
        Ok(())
    }

    /// Restore every protocol's enable switch to its default.
    pub fn reset_enabled(&mut self) {
        for info in &mut self.protocols {
            info.enabled = info.enabled_by_default;
        }
    }

    /// Iterate over every registered protocol in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ProtocolId, &ProtocolInfo)> {
        self.protocols
            .iter()
            .zip(0u32..)
            .map(|(info, index)| (ProtocolId(index), info))
    }

    /// Number of registered protocols.
    #[must_use]
    pub fn len(&self) -> usize { self.protocols.len() }

    /// Whether no protocol has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.protocols.is_empty() }

    fn get_mut(&mut self, id: ProtocolId) -> Result<&mut ProtocolInfo> {
        self.protocols
            .get_mut(id.0 as usize)
            .ok_or(RegistryError::UnknownProtocol(id))
    }
}

/// Identifier for the protocol registered after `count` others.
fn next_protocol_id(count: usize) -> Result<ProtocolId> {
    u32::try_from(count)
        .map(ProtocolId)
        .map_err(|_| RegistryError::TooManyProtocols)
}
