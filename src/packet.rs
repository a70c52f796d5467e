//! Per-packet mutable state threaded through every dissector invocation.
//!
//! A [`PacketContext`] lives for exactly one packet. The dispatch engine
//! saves the fields it changes before each invocation and restores them
//! afterwards, whether the invocation accepted, rejected, or faulted.

use std::sync::Arc;

use crate::{
    fault::{AbandonedFault, DissectError},
    protocol::ProtocolId,
    table::Guid,
    tvb::Tvb,
};

/// A named view of packet bytes, such as the raw frame or a reassembled
/// payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataSource {
    name: String,
    tvb: Tvb,
}

impl DataSource {
    /// Name shown for this source.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Bytes of this source.
    #[must_use]
    pub fn tvb(&self) -> &Tvb { &self.tvb }
}

/// Request from a dissector for more bytes before it can decode a PDU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DesegmentRequest {
    /// Offset in the current view where the incomplete PDU starts.
    pub offset: usize,
    /// Additional bytes needed.
    pub len: usize,
}

/// Mutable state for one packet.
#[derive(Debug, Default)]
pub struct PacketContext {
    frame_number: u64,
    current_proto: Option<Arc<str>>,
    heuristic_name: Option<Arc<str>>,
    can_desegment: u8,
    saved_can_desegment: u8,
    desegment_request: Option<DesegmentRequest>,
    match_uint: Option<u32>,
    match_string: Option<String>,
    match_guid: Option<Guid>,
    layers: Vec<ProtocolId>,
    data_sources: Vec<DataSource>,
    depth: usize,
    abandoned: Option<u64>,
    abandon_seq: u64,
}

/// Fields an invocation restores once it returns.
pub(crate) struct SavedState {
    current_proto: Option<Arc<str>>,
    can_desegment: u8,
    saved_can_desegment: u8,
}

impl PacketContext {
    /// Create the context for frame `frame_number`.
    #[must_use]
    pub fn new(frame_number: u64) -> Self {
        Self {
            frame_number,
            ..Self::default()
        }
    }

    /// Number of the frame being dissected.
    #[must_use]
    pub fn frame_number(&self) -> u64 { self.frame_number }

    /// Short name of the protocol currently being dissected.
    #[must_use]
    pub fn current_proto(&self) -> Option<&str> { self.current_proto.as_deref() }

    /// Short name of the heuristic entry currently being tried.
    #[must_use]
    pub fn heuristic_name(&self) -> Option<&str> { self.heuristic_name.as_deref() }

    /// How many more nesting levels may still request desegmentation.
    #[must_use]
    pub fn can_desegment(&self) -> u8 { self.can_desegment }

    /// Value of [`can_desegment`](Self::can_desegment) in the caller's frame.
    #[must_use]
    pub fn saved_can_desegment(&self) -> u8 { self.saved_can_desegment }

    /// Offer desegmentation to the next `levels` nested dissectors.
    ///
    /// A reassembling dissector sets this to 2 before delegating, so that the
    /// dissector it calls directly sees 1 and may request more data, while
    /// anything nested deeper sees 0.
    pub fn set_can_desegment(&mut self, levels: u8) { self.can_desegment = levels; }

    /// Ask the reassembling parent for `len` more bytes starting at `offset`.
    ///
    /// Returns `false` and records nothing when desegmentation is not on
    /// offer at this nesting level.
    pub fn request_desegment(&mut self, offset: usize, len: usize) -> bool {
        if self.can_desegment == 0 {
            return false;
        }
        self.desegment_request = Some(DesegmentRequest { offset, len });
        true
    }

    /// Remove and return the pending desegmentation request.
    pub fn take_desegment_request(&mut self) -> Option<DesegmentRequest> {
        self.desegment_request.take()
    }

    /// Integer selector that routed to the current dissector.
    #[must_use]
    pub fn match_uint(&self) -> Option<u32> { self.match_uint }

    /// String selector that routed to the current dissector.
    #[must_use]
    pub fn match_string(&self) -> Option<&str> { self.match_string.as_deref() }

    /// GUID selector that routed to the current dissector.
    #[must_use]
    pub fn match_guid(&self) -> Option<Guid> { self.match_guid }

    /// Protocols recognised so far, outermost first.
    #[must_use]
    pub fn layers(&self) -> &[ProtocolId] { &self.layers }

    /// Number of recognised layers.
    #[must_use]
    pub fn layer_count(&self) -> usize { self.layers.len() }

    /// Whether `protocol` appears anywhere in the layer stack.
    #[must_use]
    pub fn contains_layer(&self, protocol: ProtocolId) -> bool { self.layers.contains(&protocol) }

    /// Append a named view of bytes, such as a reassembled payload.
    pub fn add_data_source(&mut self, name: impl Into<String>, tvb: Tvb) {
        self.data_sources.push(DataSource {
            name: name.into(),
            tvb,
        });
    }

    /// Every data source in the order they were added.
    #[must_use]
    pub fn data_sources(&self) -> &[DataSource] { &self.data_sources }

    /// Nesting depth of the running dissector; zero outside any dissector.
    #[must_use]
    pub fn depth(&self) -> usize { self.depth }

    pub(crate) fn enter(&mut self, proto: Option<Arc<str>>) -> SavedState {
        let saved = SavedState {
            current_proto: self.current_proto.clone(),
            can_desegment: self.can_desegment,
            saved_can_desegment: self.saved_can_desegment,
        };
        if proto.is_some() {
            self.current_proto = proto;
        }
        self.saved_can_desegment = self.can_desegment;
        self.can_desegment = self.can_desegment.saturating_sub(1);
        self.depth += 1;
        saved
    }

    pub(crate) fn restore(&mut self, saved: SavedState) {
        self.current_proto = saved.current_proto;
        self.can_desegment = saved.can_desegment;
        self.saved_can_desegment = saved.saved_can_desegment;
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn push_layer(&mut self, protocol: ProtocolId) { self.layers.push(protocol); }

    pub(crate) fn truncate_layers(&mut self, len: usize) { self.layers.truncate(len); }

    pub(crate) fn replace_heuristic_name(&mut self, name: Option<Arc<str>>) -> Option<Arc<str>> {
        std::mem::replace(&mut self.heuristic_name, name)
    }

    pub(crate) fn replace_match_uint(&mut self, value: Option<u32>) -> Option<u32> {
        std::mem::replace(&mut self.match_uint, value)
    }

    pub(crate) fn replace_match_string(&mut self, value: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.match_string, value)
    }

    pub(crate) fn replace_match_guid(&mut self, value: Option<Guid>) -> Option<Guid> {
        std::mem::replace(&mut self.match_guid, value)
    }

    /// Whether `error` is the fault an inner invocation already abandoned.
    pub(crate) fn is_unwinding(&self, error: &DissectError) -> bool {
        matches!(error, DissectError::Abandoned(fault) if self.abandoned == Some(fault.id()))
    }

    /// Tag `fault` with a fresh identity and remember it as unwinding.
    pub(crate) fn mark_abandoned(&mut self, fault: DissectError) -> DissectError {
        self.abandon_seq += 1;
        self.abandoned = Some(self.abandon_seq);
        DissectError::Abandoned(AbandonedFault::new(self.abandon_seq, fault))
    }

    pub(crate) fn clear_abandoned(&mut self) {
        self.abandoned = None;
    }

    /// Clear everything the engine saves and restores, leaving the layer
    /// stack, data sources, and frame number intact.
    pub(crate) fn reset_dispatch_state(&mut self) {
        self.current_proto = None;
        self.heuristic_name = None;
        self.can_desegment = 0;
        self.saved_can_desegment = 0;
        self.match_uint = None;
        self.match_string = None;
        self.match_guid = None;
        self.depth = 0;
        self.abandoned = None;
    }
}

#[cfg(test)]
mod tests;
