use super::Registry;
use crate::{handle::DissectorHandle, postdissector::PostdissectorList};

impl Registry {
    /// Run `handle` after every primary dissection pass.
    ///
    /// Returns `false` if it was already registered.
    pub fn register_postdissector(&mut self, handle: &DissectorHandle) -> bool {
        let added = self.postdissectors.register(handle.clone());
        if added {
            log::debug!("registered postdissector: handle={}", handle.label());
        }
        added
    }

    /// Stop running `handle` after dissection.
    pub fn deregister_postdissector(&mut self, handle: &DissectorHandle) -> bool {
        self.postdissectors.deregister(handle)
    }

    /// Whether any registered postdissector would run.
    #[must_use]
    pub fn has_active_postdissectors(&self) -> bool { self.postdissectors.has_active(&self.protocols) }

    /// Registered postdissectors in invocation order.
    #[must_use]
    pub fn postdissectors(&self) -> &PostdissectorList { &self.postdissectors }
}
