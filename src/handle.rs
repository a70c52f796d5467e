//! Dissector handles: invocable identities bound to a protocol.
//!
//! A [`DissectorHandle`] is what tables, heuristic lists, and the
//! postdissector list store. Named handles are created through
//! [`Registry::register_dissector`](crate::registry::Registry::register_dissector)
//! and can be found by name; anonymous handles are created with
//! [`DissectorHandle::anonymous`] by decoders that want a private helper.

use std::{
    any::Any,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{
    dispatch::Dispatcher,
    fault::DissectError,
    packet::PacketContext,
    protocol::ProtocolId,
    tree::ProtoTree,
    tvb::Tvb,
};

/// Result of a dissector invocation: consumed length, zero for rejection.
pub type DissectResult = Result<usize, DissectError>;

/// Optional side-channel a caller hands to the dissector it invokes.
///
/// Parents use it to pass pre-parsed header state down to a child without
/// re-parsing. Children downcast it to the type they expect.
pub type DissectorData<'a> = Option<&'a (dyn Any + 'static)>;

/// A decoder for one protocol.
///
/// Implementations consume bytes from `tvb`, may add items to `tree`, and may
/// call back into `dx` to hand the rest of the data to child protocols. They
/// must not keep `pinfo` or `tvb` past their own return.
pub trait Dissector: Send + Sync {
    /// Dissect `tvb`, returning the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Returns a [`DissectError`] when the data is malformed or a byte
    /// accessor runs out of range.
    fn dissect(
        &self,
        dx: Dispatcher<'_>,
        tvb: &Tvb,
        pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
        data: DissectorData<'_>,
    ) -> DissectResult;
}

/// [`Dissector`] backed by a closure. Build one with [`dissector_fn`].
pub struct FnDissector<F>(F);

impl<F> Dissector for FnDissector<F>
where
    F: Fn(Dispatcher<'_>, &Tvb, &mut PacketContext, &mut ProtoTree, DissectorData<'_>) -> DissectResult
        + Send
        + Sync,
{
    fn dissect(
        &self,
        dx: Dispatcher<'_>,
        tvb: &Tvb,
        pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
        data: DissectorData<'_>,
    ) -> DissectResult {
        (self.0)(dx, tvb, pinfo, tree, data)
    }
}

/// Wrap a closure as a [`Dissector`].
///
/// ```
/// use dissect_core::handle::{DissectorHandle, dissector_fn};
///
/// let payload = DissectorHandle::anonymous(
///     None,
///     dissector_fn(|_dx, tvb, _pinfo, tree, _data| {
///         tree.add_text("payload");
///         Ok(tvb.captured_len())
///     }),
/// );
/// assert!(payload.name().is_none());
/// ```
pub fn dissector_fn<F>(f: F) -> FnDissector<F>
where
    F: Fn(Dispatcher<'_>, &Tvb, &mut PacketContext, &mut ProtoTree, DissectorData<'_>) -> DissectResult
        + Send
        + Sync,
{
    FnDissector(f)
}

/// Generic byte-dump dissector used as the last-resort fallback.
///
/// It belongs to no protocol, adds one text item, and consumes everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct DataDissector;

impl Dissector for DataDissector {
    fn dissect(
        &self,
        _dx: Dispatcher<'_>,
        tvb: &Tvb,
        _pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
        _data: DissectorData<'_>,
    ) -> DissectResult {
        let len = tvb.captured_len();
        tree.add_text(format!("Data ({len} bytes)"));
        Ok(len)
    }
}

struct HandleInner {
    name: Option<String>,
    protocol: Option<ProtocolId>,
    dissector: Box<dyn Dissector>,
    live: AtomicBool,
}

/// Shared, invocable reference to a dissector.
///
/// Clones refer to the same dissector. Equality is identity: two handles
/// are equal only if one is a clone of the other.
#[derive(Clone)]
pub struct DissectorHandle(Arc<HandleInner>);

impl DissectorHandle {
    /// Create an unnamed handle owned by the caller.
    #[must_use]
    pub fn anonymous(protocol: Option<ProtocolId>, dissector: impl Dissector + 'static) -> Self {
        Self::build(None, protocol, Box::new(dissector))
    }

    pub(crate) fn named(
        name: &str,
        protocol: Option<ProtocolId>,
        dissector: Box<dyn Dissector>,
    ) -> Self {
        Self::build(Some(name.to_owned()), protocol, dissector)
    }

    fn build(name: Option<String>, protocol: Option<ProtocolId>, dissector: Box<dyn Dissector>) -> Self {
        Self(Arc::new(HandleInner {
            name,
            protocol,
            dissector,
            live: AtomicBool::new(true),
        }))
    }

    /// Registered name, if the handle is named.
    #[must_use]
    pub fn name(&self) -> Option<&str> { self.0.name.as_deref() }

    /// Protocol the handle decodes, if any.
    #[must_use]
    pub fn protocol(&self) -> Option<ProtocolId> { self.0.protocol }

    /// Whether the handle may still be invoked.
    ///
    /// Deregistration clears this flag on every clone.
    #[must_use]
    pub fn is_live(&self) -> bool { self.0.live.load(Ordering::Acquire) }

    /// Label used in logs and Decode As listings.
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.0.name, self.0.protocol) {
            (Some(name), _) => name.clone(),
            (None, Some(protocol)) => format!("<anonymous {protocol}>"),
            (None, None) => "<anonymous>".to_owned(),
        }
    }

    pub(crate) fn dissector(&self) -> &dyn Dissector { self.0.dissector.as_ref() }

    pub(crate) fn invalidate(&self) { self.0.live.store(false, Ordering::Release); }
}

impl PartialEq for DissectorHandle {
    fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl Eq for DissectorHandle {}

impl fmt::Debug for DissectorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DissectorHandle")
            .field("name", &self.0.name)
            .field("protocol", &self.0.protocol)
            .field("live", &self.is_live())
            .finish_non_exhaustive()
    }
}
