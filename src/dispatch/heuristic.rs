use super::Dispatcher;
use crate::{
    error::RegistryError,
    fault::DissectError,
    handle::DissectorData,
    heuristic::HeuristicMatch,
    packet::PacketContext,
    tree::ProtoTree,
    tvb::Tvb,
};

impl Dispatcher<'_> {
    /// Offer `tvb` to the entries of heuristic list `list`, most recently
    /// registered first, until one accepts. An entry whose fault was
    /// recovered counts as accepting.
    ///
    /// Disabled entries and entries whose protocol is disabled are skipped.
    /// While an entry runs, [`PacketContext::heuristic_name`] is its short
    /// name. Returns `None` when every entry rejected the data; the packet
    /// context is then as it was before the call.
    ///
    /// # Errors
    ///
    /// Returns [`DissectError::Bug`] for an unknown list, and any fault
    /// abandoned by an entry.
    pub fn try_heuristic(
        self,
        list: &str,
        tvb: &Tvb,
        pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
        data: DissectorData<'_>,
    ) -> Result<Option<HeuristicMatch>, DissectError> {
        let chain = self
            .registry
            .heuristic_list(list)
            .ok_or_else(|| RegistryError::UnknownHeuristicList(list.to_owned()))?;
        let protocols = self.registry.protocols();

        for entry in chain.entries() {
            if !entry.is_enabled() {
                continue;
            }
            if let Some(protocol) = entry.protocol()
                && !protocols.is_enabled(protocol)
            {
                continue;
            }
            let previous = pinfo.replace_heuristic_name(Some(entry.shared_short_name()));
            let result = self.run(entry.handle(), tvb, pinfo, tree, data, true);
            pinfo.replace_heuristic_name(previous);
            let outcome = result?;
            if outcome.is_accepted() {
                return Ok(Some(HeuristicMatch {
                    short_name: entry.shared_short_name(),
                    consumed: outcome.consumed,
                }));
            }
        }
        Ok(None)
    }
}
