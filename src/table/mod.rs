//! Selector-keyed dissector tables with Decode As bindings.
//!
//! A [`DissectorTable`] maps selector values, such as port numbers or media
//! types, to the handle responsible for them. Each selector holds a
//! [`Binding`] with an initial and a current side: setup code writes both,
//! while runtime reinterpretation ("Decode As") writes only the current side
//! and can be undone with a reset.
//!
//! Tables are created and mutated through
//! [`Registry`](crate::registry::Registry); this module owns the per-table
//! bookkeeping and key normalization.

mod binding;
mod selector;

use std::collections::BTreeMap;

pub use binding::Binding;
pub use selector::{Guid, ParseGuidError, Selector, SelectorKind, StringCase, UintWidth};

use crate::{
    error::{RegistryError, Result},
    handle::DissectorHandle,
    protocol::ProtocolId,
};

/// A named table routing selector values to dissector handles.
///
/// ```
/// use dissect_core::table::{DissectorTable, SelectorKind, UintWidth};
///
/// let table = DissectorTable::new("udp.port", SelectorKind::Uint(UintWidth::U16))
///     .with_ui_name("UDP port")
///     .allow_decode_as();
/// assert_eq!(table.ui_name(), "UDP port");
/// assert!(table.supports_decode_as());
/// ```
#[derive(Debug)]
pub struct DissectorTable {
    name: String,
    ui_name: String,
    kind: SelectorKind,
    protocol: Option<ProtocolId>,
    decode_as: bool,
    candidates: Vec<DissectorHandle>,
    bindings: BTreeMap<Selector, Binding>,
}

impl DissectorTable {
    /// Create an empty table keyed by `kind`.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SelectorKind) -> Self {
        let name = name.into();
        Self {
            ui_name: name.clone(),
            name,
            kind,
            protocol: None,
            decode_as: false,
            candidates: Vec::new(),
            bindings: BTreeMap::new(),
        }
    }

    /// Set the human-readable name shown in Decode As listings.
    #[must_use]
    pub fn with_ui_name(mut self, ui_name: impl Into<String>) -> Self {
        self.ui_name = ui_name.into();
        self
    }

    /// Record the protocol that owns the demultiplexing point.
    #[must_use]
    pub fn with_protocol(mut self, protocol: ProtocolId) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Allow runtime reinterpretation and track candidate handles.
    #[must_use]
    pub fn allow_decode_as(mut self) -> Self {
        self.decode_as = true;
        self
    }

    /// Unique table name.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Human-readable name.
    #[must_use]
    pub fn ui_name(&self) -> &str { &self.ui_name }

    /// Selector kind fixed at creation.
    #[must_use]
    pub fn kind(&self) -> SelectorKind { self.kind }

    /// Owning protocol, if any.
    #[must_use]
    pub fn protocol(&self) -> Option<ProtocolId> { self.protocol }

    /// Whether Decode As is supported.
    #[must_use]
    pub fn supports_decode_as(&self) -> bool { self.decode_as }

    /// Handles that could be installed through Decode As.
    ///
    /// This list is for enumeration only; dispatch never consults it.
    #[must_use]
    pub fn candidates(&self) -> &[DissectorHandle] { &self.candidates }

    /// Iterate over every binding in selector order.
    pub fn bindings(&self) -> impl Iterator<Item = (&Selector, &Binding)> { self.bindings.iter() }

    /// Number of bindings, including ones whose current side is empty.
    #[must_use]
    pub fn len(&self) -> usize { self.bindings.len() }

    /// Whether the table has no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bindings.is_empty() }

    /// Borrow the binding for `selector`.
    ///
    /// # Errors
    ///
    /// Returns an error if `selector` does not fit the table's kind.
    pub fn binding(&self, selector: impl Into<Selector>) -> Result<Option<&Binding>> {
        let key = self.normalize(selector.into())?;
        Ok(self.bindings.get(&key))
    }

    /// Current handle for `selector`.
    ///
    /// # Errors
    ///
    /// Returns an error if `selector` does not fit the table's kind.
    pub fn lookup(&self, selector: impl Into<Selector>) -> Result<Option<&DissectorHandle>> {
        Ok(self.binding(selector)?.and_then(Binding::current))
    }

    /// Initial handle for `selector`.
    ///
    /// # Errors
    ///
    /// Returns an error if `selector` does not fit the table's kind.
    pub fn lookup_default(&self, selector: impl Into<Selector>) -> Result<Option<&DissectorHandle>> {
        Ok(self.binding(selector)?.and_then(Binding::initial))
    }

    /// Check `selector` against the table's kind and return the stored key.
    ///
    /// Case-insensitive string tables fold keys to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SelectorKindMismatch`] for a selector of the
    /// wrong kind and [`RegistryError::SelectorOutOfRange`] for an integer
    /// wider than the table's keys.
    pub fn normalize(&self, selector: Selector) -> Result<Selector> {
        match (self.kind, selector) {
            (SelectorKind::Uint(width), Selector::Uint(value)) => {
                if value > width.max() {
                    return Err(RegistryError::SelectorOutOfRange {
                        table: self.name.clone(),
                        value,
                        width: width.bytes(),
                    });
                }
                Ok(Selector::Uint(value))
            }
            (SelectorKind::String(StringCase::Sensitive), Selector::String(value)) => {
                Ok(Selector::String(value))
            }
            (SelectorKind::String(StringCase::Insensitive), Selector::String(value)) => {
                Ok(Selector::String(value.to_lowercase()))
            }
            (SelectorKind::Guid, Selector::Guid(value)) => Ok(Selector::Guid(value)),
            (expected, other) => Err(RegistryError::SelectorKindMismatch {
                table: self.name.clone(),
                expected,
                found: other.kind_name(),
            }),
        }
    }

    pub(crate) fn add(&mut self, selector: Selector, handle: DissectorHandle) -> Result<()> {
        let key = self.normalize(selector)?;
        self.add_candidate(&handle);
        self.bindings.insert(key, Binding::new(handle));
        Ok(())
    }

    pub(crate) fn add_candidate(&mut self, handle: &DissectorHandle) {
        if self.decode_as && !self.candidates.contains(handle) {
            self.candidates.push(handle.clone());
        }
    }

    /// Replace the current side of `selector`, or create a binding with no
    /// initial side. Clearing a selector that has no binding creates nothing.
    pub(crate) fn change(&mut self, selector: Selector, handle: Option<DissectorHandle>) -> Result<()> {
        let key = self.normalize(selector)?;
        if let Some(binding) = self.bindings.get_mut(&key) {
            binding.current = handle;
            return Ok(());
        }
        if let Some(handle) = handle {
            self.bindings.insert(
                key,
                Binding {
                    initial: None,
                    current: Some(handle),
                },
            );
        }
        Ok(())
    }

    pub(crate) fn reset(&mut self, selector: Selector) -> Result<()> {
        let key = self.normalize(selector)?;
        self.reset_key(&key);
        Ok(())
    }

    pub(crate) fn delete(&mut self, selector: Selector) -> Result<bool> {
        let key = self.normalize(selector)?;
        Ok(self.bindings.remove(&key).is_some())
    }

    /// Remove every binding currently routed to `handle`.
    pub(crate) fn delete_all(&mut self, handle: &DissectorHandle) -> usize {
        let before = self.bindings.len();
        self.bindings
            .retain(|_, binding| binding.current.as_ref() != Some(handle));
        before - self.bindings.len()
    }

    /// Remove every reference to `handle`, reverting bindings that pointed at
    /// it to their initial side.
    pub(crate) fn purge(&mut self, handle: &DissectorHandle) {
        self.candidates.retain(|candidate| candidate != handle);
        self.bindings.retain(|_, binding| !binding.purge(handle));
    }

    /// Reset every changed binding and return how many were touched.
    pub(crate) fn reset_changed(&mut self) -> usize {
        let changed: Vec<Selector> = self
            .bindings
            .iter()
            .filter(|(_, binding)| binding.is_changed())
            .map(|(key, _)| key.clone())
            .collect();
        for key in &changed {
            self.reset_key(key);
        }
        changed.len()
    }

    fn reset_key(&mut self, key: &Selector) {
        let Some(binding) = self.bindings.get_mut(key) else {
            return;
        };
        if binding.initial.is_some() {
            binding.current.clone_from(&binding.initial);
        } else {
            self.bindings.remove(key);
        }
    }
}

#[cfg(test)]
mod tests;
