use super::Registry;
use crate::{
    error::{RegistryError, Result},
    handle::DissectorHandle,
    heuristic::{HeuristicEntry, HeuristicList},
    protocol::ProtocolId,
};

impl Registry {
    /// Create an empty heuristic list.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateHeuristicList`] if the name is taken.
    pub fn register_heuristic_list(&mut self, name: &str, protocol: Option<ProtocolId>) -> Result<()> {
        if self.heuristics.contains_key(name) {
            return self.violation(RegistryError::DuplicateHeuristicList(name.to_owned()));
        }
        self.heuristics
            .insert(name.to_owned(), HeuristicList::new(name, protocol));
        log::debug!("registered heuristic list: name={name}");
        Ok(())
    }

    /// Add `handle` to the front of heuristic list `list`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownHeuristicList`] for an unknown list,
    /// [`RegistryError::DuplicateHeuristicShortName`] if `short_name` is used
    /// by any entry of any list, and
    /// [`RegistryError::DuplicateHeuristicEntry`] if the list already holds
    /// the same handle for the same protocol.
    pub fn register_heuristic(
        &mut self,
        list: &str,
        handle: &DissectorHandle,
        display_name: &str,
        short_name: &str,
        protocol: Option<ProtocolId>,
        enabled_by_default: bool,
    ) -> Result<()> {
        let Some(existing) = self.heuristics.get(list) else {
            return self.violation(RegistryError::UnknownHeuristicList(list.to_owned()));
        };
        if self.heuristic_names.contains_key(short_name) {
            return self.violation(RegistryError::DuplicateHeuristicShortName(short_name.to_owned()));
        }
        if existing.contains(handle, protocol) {
            return self.violation(RegistryError::DuplicateHeuristicEntry(list.to_owned()));
        }
        let entry = HeuristicEntry::new(handle.clone(), protocol, short_name, display_name, enabled_by_default);
        self.heuristic_names
            .insert(entry.shared_short_name(), list.to_owned());
        if let Some(target) = self.heuristics.get_mut(list) {
            target.push_front(entry);
        }
        log::debug!("registered heuristic: list={list}, short_name={short_name}");
        Ok(())
    }

    /// Remove the first entry of `list` for `handle` and `protocol`, freeing
    /// its short name. Returns whether an entry was removed.
    pub fn deregister_heuristic(&mut self, list: &str, handle: &DissectorHandle, protocol: Option<ProtocolId>) -> bool {
        let Some(removed) = self
            .heuristics
            .get_mut(list)
            .and_then(|l| l.remove(handle, protocol))
        else {
            return false;
        };
        self.heuristic_names.remove(removed.short_name());
        true
    }

    /// Find a heuristic entry by its short name.
    #[must_use]
    pub fn find_heuristic(&self, short_name: &str) -> Option<&HeuristicEntry> {
        let list = self.heuristic_names.get(short_name)?;
        self.heuristics
            .get(list)?
            .entries()
            .iter()
            .find(|e| e.short_name() == short_name)
    }

    /// Enable or disable the entry named `short_name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownDissector`] if no entry has that name.
    pub fn set_heuristic_enabled(&mut self, short_name: &str, enabled: bool) -> Result<()> {
        let entry = self
            .heuristic_names
            .get(short_name)
            .and_then(|list| self.heuristics.get_mut(list))
            .and_then(|list| list.entry_mut(short_name));
        match entry {
            Some(entry) => {
                entry.set_enabled(enabled);
                Ok(())
            }
            None => self.violation(RegistryError::UnknownDissector(short_name.to_owned())),
        }
    }

    /// Restore every heuristic entry's enable flag to its default.
    pub fn reset_heuristics(&mut self) {
        for list in self.heuristics.values_mut() {
            list.reset_enabled();
        }
    }

    /// Borrow a heuristic list by name.
    #[must_use]
    pub fn heuristic_list(&self, name: &str) -> Option<&HeuristicList> { self.heuristics.get(name) }
}
