use std::ops::RangeInclusive;

use super::Registry;
use crate::{
    error::{RegistryError, Result},
    handle::DissectorHandle,
    table::{DissectorTable, Selector},
};

impl Registry {
    /// Register a dissector table.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTable`] if the name is taken.
    pub fn register_table(&mut self, table: DissectorTable) -> Result<()> {
        if self.tables.contains_key(table.name()) {
            return self.violation(RegistryError::DuplicateTable(table.name().to_owned()));
        }
        log::debug!("registered dissector table: name={}, kind={}", table.name(), table.kind());
        self.tables.insert(table.name().to_owned(), table);
        Ok(())
    }

    /// Remove a table and all of its bindings.
    pub fn deregister_table(&mut self, name: &str) -> Option<DissectorTable> { self.tables.remove(name) }

    /// Borrow a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&DissectorTable> { self.tables.get(name) }

    /// Iterate over every table in name order.
    pub fn tables(&self) -> impl Iterator<Item = &DissectorTable> { self.tables.values() }

    /// Bind `selector` to `handle` on both the initial and current side.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown table or a selector that does not fit
    /// the table's kind.
    pub fn add(&mut self, table: &str, selector: impl Into<Selector>, handle: &DissectorHandle) -> Result<()> {
        let selector = selector.into();
        let result = self.table_mut(table).and_then(|t| t.add(selector, handle.clone()));
        self.checked(result)
    }

    /// Bind every value in each inclusive range to `handle`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown table, a table that is not integer
    /// keyed, or a value wider than its keys. Values before the failing one
    /// stay bound.
    pub fn add_uint_range(
        &mut self,
        table: &str,
        ranges: &[RangeInclusive<u32>],
        handle: &DissectorHandle,
    ) -> Result<()> {
        let result = self.table_mut(table).and_then(|t| {
            ranges
                .iter()
                .cloned()
                .flatten()
                .try_for_each(|value| t.add(Selector::Uint(value), handle.clone()))
        });
        self.checked(result)
    }

    /// Offer `handle` as a Decode As candidate without binding it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DecodeAsUnsupported`] when the table does not
    /// allow Decode As.
    pub fn add_for_decode_as(&mut self, table: &str, handle: &DissectorHandle) -> Result<()> {
        let result = self.table_mut(table).and_then(|t| {
            if !t.supports_decode_as() {
                return Err(RegistryError::DecodeAsUnsupported(t.name().to_owned()));
            }
            t.add_candidate(handle);
            Ok(())
        });
        self.checked(result)
    }

    /// Route `selector` to `handle`, keeping the initial binding.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown table or a mismatched selector.
    pub fn change(&mut self, table: &str, selector: impl Into<Selector>, handle: &DissectorHandle) -> Result<()> {
        let selector = selector.into();
        let result = self
            .table_mut(table)
            .and_then(|t| t.change(selector, Some(handle.clone())));
        self.checked(result)
    }

    /// Route `selector` nowhere, keeping the initial binding.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown table or a mismatched selector.
    pub fn change_to_none(&mut self, table: &str, selector: impl Into<Selector>) -> Result<()> {
        let selector = selector.into();
        let result = self.table_mut(table).and_then(|t| t.change(selector, None));
        self.checked(result)
    }

    /// Restore the initial binding of `selector`, or remove the binding when
    /// it has no initial side.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown table or a mismatched selector.
    pub fn reset(&mut self, table: &str, selector: impl Into<Selector>) -> Result<()> {
        let selector = selector.into();
        let result = self.table_mut(table).and_then(|t| t.reset(selector));
        self.checked(result)
    }

    /// Remove the binding of `selector`. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown table or a mismatched selector.
    pub fn delete(&mut self, table: &str, selector: impl Into<Selector>) -> Result<bool> {
        let selector = selector.into();
        let result = self.table_mut(table).and_then(|t| t.delete(selector));
        self.checked(result)
    }

    /// Remove every binding of `table` currently routed to `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownTable`] for an unknown table.
    pub fn delete_all(&mut self, table: &str, handle: &DissectorHandle) -> Result<usize> {
        let result = self.table_mut(table).map(|t| t.delete_all(handle));
        self.checked(result)
    }

    /// Handle currently bound to `selector`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown table or a mismatched selector.
    pub fn lookup(&self, table: &str, selector: impl Into<Selector>) -> Result<Option<&DissectorHandle>> {
        let selector = selector.into();
        match self.tables.get(table) {
            Some(t) => match t.lookup(selector) {
                Ok(handle) => Ok(handle),
                Err(err) => self.violation(err),
            },
            None => self.violation(RegistryError::UnknownTable(table.to_owned())),
        }
    }

    /// Handle initially bound to `selector`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown table or a mismatched selector.
    pub fn lookup_default(&self, table: &str, selector: impl Into<Selector>) -> Result<Option<&DissectorHandle>> {
        let selector = selector.into();
        match self.tables.get(table) {
            Some(t) => match t.lookup_default(selector) {
                Ok(handle) => Ok(handle),
                Err(err) => self.violation(err),
            },
            None => self.violation(RegistryError::UnknownTable(table.to_owned())),
        }
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut DissectorTable> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| RegistryError::UnknownTable(name.to_owned()))
    }
}
