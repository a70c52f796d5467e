//! Top-level entry point for one packet.

use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
};

use log::error;

use crate::{
    fault::DissectError,
    handle::DissectorHandle,
    metrics,
    packet::PacketContext,
    registry::Registry,
    tree::ProtoTree,
    tvb::Tvb,
};

/// How dissection of one packet ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PacketStatus {
    /// The root dissector, or the fallback, consumed `consumed` bytes.
    ///
    /// `consumed` is zero when a fault was recovered on an empty frame.
    Accepted {
        /// Bytes consumed by the root invocation.
        consumed: usize,
    },
    /// Nothing accepted the packet.
    Rejected,
    /// A hard fault or a panic stopped dissection of this packet.
    Abandoned {
        /// Rendered fault or panic message.
        reason: String,
    },
}

impl PacketStatus {
    /// Label used for metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted { .. } => "accepted",
            Self::Rejected => "rejected",
            Self::Abandoned { .. } => "abandoned",
        }
    }

    /// Whether the packet was abandoned.
    #[must_use]
    pub fn is_abandoned(&self) -> bool { matches!(self, Self::Abandoned { .. }) }
}

/// Everything produced while dissecting one packet.
#[derive(Debug)]
pub struct DissectedPacket {
    /// Outcome of the primary pass, or of a postdissector that was abandoned.
    pub status: PacketStatus,
    /// Final packet context, including the layer stack and data sources.
    pub context: PacketContext,
    /// Items added by every dissector that ran.
    pub tree: ProtoTree,
}

impl Registry {
    /// Dissect one packet starting at `root`, then run the postdissectors.
    ///
    /// Abandoned faults and panics raised by dissectors are contained here:
    /// the packet is marked malformed, whatever was decoded before the fault
    /// is kept, and the next packet can be dissected normally.
    #[must_use]
    pub fn dissect(&self, root: &DissectorHandle, frame_number: u64, tvb: Tvb) -> DissectedPacket {
        let dx = self.dispatcher();
        let mut pinfo = PacketContext::new(frame_number);
        let mut tree = ProtoTree::new();
        pinfo.add_data_source("Frame", tvb.clone());

        let primary = guarded(frame_number, || {
            dx.run_with_fallback(root, &tvb, &mut pinfo, &mut tree, None)
        });
        let mut status = match primary {
            Ok(outcome) if outcome.is_accepted() => PacketStatus::Accepted {
                consumed: outcome.consumed,
            },
            Ok(_) => PacketStatus::Rejected,
            Err(reason) => self.abandon(frame_number, reason, &tvb, &pinfo, &mut tree),
        };

        pinfo.reset_dispatch_state();
        tree.reset_depth();
        if self.has_active_postdissectors() {
            let post = guarded(frame_number, || dx.call_postdissectors(&tvb, &mut pinfo, &mut tree));
            if let Err(reason) = post {
                let abandoned = self.abandon(frame_number, reason, &tvb, &pinfo, &mut tree);
                if !status.is_abandoned() {
                    status = abandoned;
                }
            }
            pinfo.reset_dispatch_state();
            tree.reset_depth();
        }

        metrics::inc_packets(status.as_str());
        DissectedPacket {
            status,
            context: pinfo,
            tree,
        }
    }

    fn abandon(
        &self,
        frame_number: u64,
        reason: String,
        tvb: &Tvb,
        pinfo: &PacketContext,
        tree: &mut ProtoTree,
    ) -> PacketStatus {
        error!("packet abandoned: frame={frame_number}, reason={reason}");
        tracing::error!(frame = frame_number, reason = %reason, "packet abandoned");
        let innermost = pinfo
            .layers()
            .last()
            .and_then(|&protocol| self.protocols().short_name(protocol));
        tree.reset_depth();
        tree.add_malformed(innermost.as_deref(), tvb.captured_len());
        PacketStatus::Abandoned { reason }
    }
}

/// Run `f`, turning an abandoned fault or a panic into a rendered reason.
fn guarded<T, F>(frame_number: u64, f: F) -> Result<T, String>
where
    F: FnOnce() -> Result<T, DissectError>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result.map_err(|err| err.to_string()),
        Err(payload) => {
            metrics::inc_dissector_panics();
            let message = panic_message(payload.as_ref());
            error!("dissector panicked: frame={frame_number}, panic={message}");
            tracing::error!(frame = frame_number, panic = %message, "dissector panicked");
            Err(format!("dissector panicked: {message}"))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        format!("{payload:?}")
    }
}
