use serde::Serialize;

use super::Registry;
use crate::{handle::DissectorHandle, table::Selector};

/// A binding whose current handle differs from the one setup code chose.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DecodeAsEntry {
    /// Table holding the binding.
    pub table: String,
    /// Selector of the binding.
    pub selector: Selector,
    /// Label of the initial handle, if any.
    pub initial: Option<String>,
    /// Label of the current handle, if any.
    pub current: Option<String>,
}

impl Registry {
    /// Every changed binding, sorted by table then selector.
    #[must_use]
    pub fn decode_as_changes(&self) -> Vec<DecodeAsEntry> {
        self.tables
            .values()
            .flat_map(|table| {
                table
                    .bindings()
                    .filter(|(_, binding)| binding.is_changed())
                    .map(|(selector, binding)| DecodeAsEntry {
                        table: table.name().to_owned(),
                        selector: selector.clone(),
                        initial: binding.initial().map(DissectorHandle::label),
                        current: binding.current().map(DissectorHandle::label),
                    })
            })
            .collect()
    }

    /// Reset every changed binding in every table, so no Decode As choice
    /// carries over into the next analysis pass. Returns how many bindings
    /// were reset.
    pub fn reset_all_decode_as(&mut self) -> usize {
        let reset: usize = self.tables.values_mut().map(|t| t.reset_changed()).sum();
        if reset > 0 {
            log::debug!("reset decode-as bindings: count={reset}");
        }
        reset
    }
}
