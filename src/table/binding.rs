use crate::handle::DissectorHandle;

/// The pair of handles stored for one selector.
///
/// `initial` is what setup code registered with `add`. `current` is what
/// dispatch uses; Decode As changes only this side, so the original choice
/// can always be restored with a reset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Binding {
    pub(crate) initial: Option<DissectorHandle>,
    pub(crate) current: Option<DissectorHandle>,
}

impl Binding {
    pub(crate) fn new(handle: DissectorHandle) -> Self {
        Self {
            initial: Some(handle.clone()),
            current: Some(handle),
        }
    }

    /// Handle registered by setup code, if any.
    #[must_use]
    pub fn initial(&self) -> Option<&DissectorHandle> { self.initial.as_ref() }

    /// Handle used for dispatch, if any.
    #[must_use]
    pub fn current(&self) -> Option<&DissectorHandle> { self.current.as_ref() }

    /// Whether the current side differs from the initial side.
    #[must_use]
    pub fn is_changed(&self) -> bool { self.initial != self.current }

    /// Remove `handle` from both sides. Returns `true` when the binding no
    /// longer refers to any handle and should be dropped.
    pub(crate) fn purge(&mut self, handle: &DissectorHandle) -> bool {
        if self.initial.as_ref() == Some(handle) {
            self.initial = None;
        }
        if self.current.as_ref() == Some(handle) {
            self.current.clone_from(&self.initial);
        }
        self.initial.is_none() && self.current.is_none()
    }
}
