//! Handles run after every primary dissection pass.

use crate::{handle::DissectorHandle, protocol::ProtocolTable};

/// Postdissectors in registration order.
#[derive(Clone, Debug, Default)]
pub struct PostdissectorList {
    handles: Vec<DissectorHandle>,
}

impl PostdissectorList {
    /// Append `handle`. Registering a handle twice is ignored.
    pub(crate) fn register(&mut self, handle: DissectorHandle) -> bool {
        if self.handles.contains(&handle) {
            return false;
        }
        self.handles.push(handle);
        true
    }

    pub(crate) fn deregister(&mut self, handle: &DissectorHandle) -> bool {
        let before = self.handles.len();
        self.handles.retain(|h| h != handle);
        before != self.handles.len()
    }

    /// Whether any postdissector would run: one without a protocol, or one
    /// whose protocol is enabled.
    #[must_use]
    pub fn has_active(&self, protocols: &ProtocolTable) -> bool {
        self.handles
            .iter()
            .any(|h| h.is_live() && h.protocol().is_none_or(|p| protocols.is_enabled(p)))
    }

    /// Registered handles in invocation order.
    #[must_use]
    pub fn handles(&self) -> &[DissectorHandle] { &self.handles }

    /// Number of registered postdissectors.
    #[must_use]
    pub fn len(&self) -> usize { self.handles.len() }

    /// Whether none is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.handles.is_empty() }
}
