//! Table-driven dispatch.
//!
//! Each `try_*` method publishes the selector that matched in the packet
//! context for the duration of the call, so the invoked dissector can tell
//! which key routed to it, and restores the previous value afterwards.

use super::Dispatcher;
use crate::{
    error::RegistryError,
    fault::DissectError,
    handle::{DissectResult, DissectorData, DissectorHandle},
    packet::PacketContext,
    table::{Guid, Selector},
    tree::ProtoTree,
    tvb::Tvb,
};

impl Dispatcher<'_> {
    /// Hand `tvb` to the dissector bound to integer `value` in `table`.
    ///
    /// Returns 0 when nothing is bound.
    ///
    /// # Errors
    ///
    /// Returns [`DissectError::Bug`] for an unknown table or one not keyed by
    /// integers, and any fault abandoned by the invoked dissector.
    pub fn try_uint(
        self,
        table: &str,
        value: u32,
        tvb: &Tvb,
        pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
        data: DissectorData<'_>,
    ) -> DissectResult {
        self.try_uint_with(table, value, tvb, pinfo, tree, data, true)
    }

    /// [`try_uint`](Self::try_uint) with control over whether the invoked
    /// protocol is added to the layer stack.
    ///
    /// # Errors
    ///
    /// As for [`try_uint`](Self::try_uint).
    #[allow(clippy::too_many_arguments)]
    pub fn try_uint_with(
        self,
        table: &str,
        value: u32,
        tvb: &Tvb,
        pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
        data: DissectorData<'_>,
        add_layer: bool,
    ) -> DissectResult {
        let Some(handle) = self.route(table, Selector::Uint(value))? else {
            return Ok(0);
        };
        let previous = pinfo.replace_match_uint(Some(value));
        let result = self.invoke(&handle, tvb, pinfo, tree, data, add_layer);
        pinfo.replace_match_uint(previous);
        result
    }

    /// Hand `tvb` to the dissector bound to string `value` in `table`.
    ///
    /// # Errors
    ///
    /// Returns [`DissectError::Bug`] for an unknown table or one not keyed by
    /// strings, and any fault abandoned by the invoked dissector.
    pub fn try_string(
        self,
        table: &str,
        value: &str,
        tvb: &Tvb,
        pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
        data: DissectorData<'_>,
    ) -> DissectResult {
        let Some(handle) = self.route(table, Selector::from(value))? else {
            return Ok(0);
        };
        let previous = pinfo.replace_match_string(Some(value.to_owned()));
        let result = self.invoke(&handle, tvb, pinfo, tree, data, true);
        pinfo.replace_match_string(previous);
        result
    }

    /// Hand `tvb` to the dissector bound to `guid` in `table`.
    ///
    /// # Errors
    ///
    /// Returns [`DissectError::Bug`] for an unknown table or one not keyed by
    /// GUIDs, and any fault abandoned by the invoked dissector.
    pub fn try_guid(
        self,
        table: &str,
        guid: Guid,
        tvb: &Tvb,
        pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
        data: DissectorData<'_>,
    ) -> DissectResult {
        let Some(handle) = self.route(table, Selector::Guid(guid))? else {
            return Ok(0);
        };
        let previous = pinfo.replace_match_guid(Some(guid));
        let result = self.invoke(&handle, tvb, pinfo, tree, data, true);
        pinfo.replace_match_guid(previous);
        result
    }

    fn route(self, table: &str, selector: Selector) -> Result<Option<DissectorHandle>, DissectError> {
        let target = self
            .registry
            .table(table)
            .ok_or_else(|| RegistryError::UnknownTable(table.to_owned()))?;
        Ok(target.lookup(selector)?.cloned())
    }
}
