use super::Registry;
use crate::{
    error::{RegistryError, Result},
    handle::{Dissector, DissectorHandle},
    protocol::ProtocolId,
};

impl Registry {
    /// Register a named dissector and return its handle.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateDissector`] if `name` is taken.
    pub fn register_dissector(
        &mut self,
        name: &str,
        protocol: Option<ProtocolId>,
        dissector: impl Dissector + 'static,
    ) -> Result<DissectorHandle> {
        if self.handles.contains_key(name) {
            return self.violation(RegistryError::DuplicateDissector(name.to_owned()));
        }
        let handle = DissectorHandle::named(name, protocol, Box::new(dissector));
        self.handles.insert(name.to_owned(), handle.clone());
        log::debug!("registered dissector: name={name}, protocol={protocol:?}");
        Ok(handle)
    }

    /// Find a named dissector.
    #[must_use]
    pub fn find_dissector(&self, name: &str) -> Option<DissectorHandle> { self.handles.get(name).cloned() }

    /// Remove a named dissector from the registry and from every table and
    /// list, then invalidate it.
    ///
    /// Clones held elsewhere stay allocated but are never invoked again.
    /// Returns `None` if `name` is not registered.
    pub fn deregister_dissector(&mut self, name: &str) -> Option<DissectorHandle> {
        let handle = self.handles.remove(name)?;
        self.remove_handle(&handle);
        handle.invalidate();
        log::debug!("deregistered dissector: name={name}");
        Some(handle)
    }

    /// Remove every reference to `handle` from tables, heuristic lists, and
    /// the postdissector list.
    ///
    /// Table bindings that pointed at the handle revert to their initial side,
    /// or disappear when nothing remains. This is how owners of anonymous
    /// handles withdraw them.
    pub fn remove_handle(&mut self, handle: &DissectorHandle) {
        for table in self.tables.values_mut() {
            table.purge(handle);
        }
        for list in self.heuristics.values_mut() {
            for short_name in list.purge(handle) {
                self.heuristic_names.remove(&short_name);
            }
        }
        self.postdissectors.deregister(handle);
    }
}
