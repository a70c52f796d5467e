//! The dispatch engine: invokes handles and contains their faults.
//!
//! Every dissector receives a [`Dispatcher`] and calls back through it to
//! hand data to child protocols. Each call goes through [`Dispatcher::invoke`],
//! which:
//!
//! 1. returns 0 without running anything when the handle was deregistered or
//!    its protocol is disabled;
//! 2. saves the packet context fields it changes and publishes the handle's
//!    protocol as the current one;
//! 3. appends the protocol to the layer stack when asked to;
//! 4. runs the dissector and adjudicates any fault through the registry's
//!    [`FaultPolicyHook`](crate::fault::FaultPolicyHook);
//! 5. truncates the layer stack back to its earlier length when the result is
//!    a rejection, including layers added by nested calls that accepted (a
//!    recovered fault is never a rejection, even on an empty view);
//! 6. restores the saved fields whatever the outcome.

mod frame;
mod heuristic;
mod lookup;

pub use frame::{DissectedPacket, PacketStatus};

use crate::{
    fault::{DissectError, FaultContext, FaultPolicy},
    handle::{DissectResult, DissectorData, DissectorHandle},
    metrics,
    packet::PacketContext,
    registry::Registry,
    tree::ProtoTree,
    tvb::Tvb,
};

/// Result of one invocation as seen by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub(crate) consumed: usize,
    pub(crate) recovered: bool,
}

impl Outcome {
    const REJECTED: Self = Self {
        consumed: 0,
        recovered: false,
    };

    /// Bytes were consumed, or a fault was recovered in place.
    pub(crate) const fn is_accepted(self) -> bool {
        self.consumed > 0 || self.recovered
    }
}

/// Read-only view of a [`Registry`] used while dissecting.
#[derive(Clone, Copy, Debug)]
pub struct Dispatcher<'r> {
    registry: &'r Registry,
}

impl<'r> Dispatcher<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self { Self { registry } }

    /// Registry this dispatcher reads from.
    #[must_use]
    pub fn registry(self) -> &'r Registry { self.registry }

    /// Invoke `handle` on `tvb`.
    ///
    /// Returns the number of bytes consumed, zero when the handle rejected
    /// the data or could not run. A recovered fault counts as consuming the
    /// whole view.
    ///
    /// # Errors
    ///
    /// Returns the fault when it was abandoned, here or in a nested call.
    /// Dissectors propagate it with `?`.
    pub fn invoke(
        self,
        handle: &DissectorHandle,
        tvb: &Tvb,
        pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
        data: DissectorData<'_>,
        add_layer: bool,
    ) -> DissectResult {
        self.run(handle, tvb, pinfo, tree, data, add_layer)
            .map(|outcome| outcome.consumed)
    }

    /// [`invoke`](Self::invoke), also reporting whether a fault was
    /// recovered. A recovered invocation is accepted even when the view was
    /// empty.
    pub(crate) fn run(
        self,
        handle: &DissectorHandle,
        tvb: &Tvb,
        pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
        data: DissectorData<'_>,
        add_layer: bool,
    ) -> Result<Outcome, DissectError> {
        if !handle.is_live() {
            return Ok(Outcome::REJECTED);
        }
        let protocols = self.registry.protocols();
        if let Some(protocol) = handle.protocol()
            && !protocols.is_enabled(protocol)
        {
            return Ok(Outcome::REJECTED);
        }

        let saved = pinfo.enter(handle.protocol().and_then(|p| protocols.short_name(p)));
        let layers_before = pinfo.layer_count();
        if add_layer && let Some(protocol) = handle.protocol() {
            pinfo.push_layer(protocol);
        }
        tree.descend();

        let max_depth = self.registry.config().max_depth;
        let result = if pinfo.depth() > max_depth {
            Err(DissectError::DepthExceeded { max: max_depth })
        } else {
            handle.dissector().dissect(self, tvb, pinfo, tree, data)
        };
        let outcome = match result {
            Ok(consumed) => {
                pinfo.clear_abandoned();
                Ok(Outcome {
                    consumed,
                    recovered: false,
                })
            }
            Err(error) => self.adjudicate(handle, tvb, pinfo, tree, error),
        };

        tree.ascend();
        if matches!(outcome, Ok(o) if !o.is_accepted()) {
            pinfo.truncate_layers(layers_before);
        }
        pinfo.restore(saved);
        outcome
    }

    /// Invoke `handle`, adding its layer, and fall back to the configured
    /// fallback dissector when it rejects the data.
    ///
    /// # Errors
    ///
    /// Returns an abandoned fault.
    pub fn call_dissector(
        self,
        handle: &DissectorHandle,
        tvb: &Tvb,
        pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
        data: DissectorData<'_>,
    ) -> DissectResult {
        self.run_with_fallback(handle, tvb, pinfo, tree, data)
            .map(|outcome| outcome.consumed)
    }

    pub(crate) fn run_with_fallback(
        self,
        handle: &DissectorHandle,
        tvb: &Tvb,
        pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
        data: DissectorData<'_>,
    ) -> Result<Outcome, DissectError> {
        let outcome = self.run(handle, tvb, pinfo, tree, data, true)?;
        if outcome.is_accepted() {
            return Ok(outcome);
        }
        match self.fallback() {
            Some(fallback) if &fallback != handle => self.run(&fallback, tvb, pinfo, tree, None, true),
            _ => Ok(outcome),
        }
    }

    /// Invoke `handle`, adding its layer, with no fallback.
    ///
    /// # Errors
    ///
    /// Returns an abandoned fault.
    pub fn call_dissector_only(
        self,
        handle: &DissectorHandle,
        tvb: &Tvb,
        pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
        data: DissectorData<'_>,
    ) -> DissectResult {
        self.invoke(handle, tvb, pinfo, tree, data, true)
    }

    /// Run every postdissector once, in registration order, ignoring what
    /// each returns.
    ///
    /// # Errors
    ///
    /// Returns the first abandoned fault; remaining postdissectors are skipped.
    pub fn call_postdissectors(
        self,
        tvb: &Tvb,
        pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
    ) -> Result<(), DissectError> {
        for handle in self.registry.postdissectors().handles() {
            self.invoke(handle, tvb, pinfo, tree, None, true)?;
        }
        Ok(())
    }

    fn fallback(self) -> Option<DissectorHandle> {
        let name = self.registry.config().fallback_dissector.as_deref()?;
        self.registry.find_dissector(name)
    }

    /// Decide what to do with a fault raised by `handle`.
    ///
    /// A fault that is already unwinding was adjudicated by the invocation
    /// that raised it and passes through unchanged. Any other fault is new,
    /// even if a dissector swallowed an earlier abandoned one. Abandoned
    /// faults leave here tagged with a fresh identity.
    fn adjudicate(
        self,
        handle: &DissectorHandle,
        tvb: &Tvb,
        pinfo: &mut PacketContext,
        tree: &mut ProtoTree,
        error: DissectError,
    ) -> Result<Outcome, DissectError> {
        if pinfo.is_unwinding(&error) {
            return Err(error);
        }
        pinfo.clear_abandoned();
        let error = match error {
            DissectError::Abandoned(stale) => stale.fault().root_cause().clone(),
            other => other,
        };
        let mut ctx = FaultContext::new()
            .with_frame_number(pinfo.frame_number())
            .with_depth(pinfo.depth());
        if let Some(protocol) = pinfo.current_proto() {
            ctx = ctx.with_protocol(protocol);
        }
        if let Some(name) = handle.name() {
            ctx = ctx.with_dissector(name);
        }

        let hook = self.registry.fault_hook();
        let policy = hook.fault_policy(&error, &ctx);
        hook.on_fault(&error, &ctx, policy);
        metrics::inc_faults(policy);

        match policy {
            FaultPolicy::Recover => {
                if self.registry.config().log_recovered_faults {
                    log::warn!(
                        "recovered dissector fault: frame={}, protocol={:?}, dissector={}, error={error}",
                        pinfo.frame_number(),
                        ctx.protocol,
                        handle.label(),
                    );
                }
                tree.add_malformed(pinfo.current_proto(), tvb.captured_len());
                Ok(Outcome {
                    consumed: tvb.captured_len(),
                    recovered: true,
                })
            }
            FaultPolicy::Abandon => Err(pinfo.mark_abandoned(error)),
        }
    }
}
