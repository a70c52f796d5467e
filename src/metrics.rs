//! Metric helpers for `dissect_core`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. Without the
//! `metrics` feature the helpers do nothing.

#[cfg(feature = "metrics")]
use metrics::counter;

use crate::fault::FaultPolicy;

/// Name of the counter tracking dissected packets by outcome.
pub const PACKETS_DISSECTED: &str = "dissect_core_packets_total";
/// Name of the counter tracking dissector faults by policy.
pub const FAULTS_TOTAL: &str = "dissect_core_faults_total";
/// Name of the counter tracking dissector panics.
pub const DISSECTOR_PANICS: &str = "dissect_core_dissector_panics_total";

/// Record a dissected packet with the given status label.
#[cfg(feature = "metrics")]
pub fn inc_packets(status: &'static str) {
    counter!(PACKETS_DISSECTED, "status" => status).increment(1);
}

/// Record a fault handled with `policy`.
#[cfg(feature = "metrics")]
pub fn inc_faults(policy: FaultPolicy) {
    counter!(FAULTS_TOTAL, "policy" => policy.as_str()).increment(1);
}

/// Record a panic raised by a dissector.
#[cfg(feature = "metrics")]
pub fn inc_dissector_panics() { counter!(DISSECTOR_PANICS).increment(1); }

/// Record a dissected packet with the given status label.
#[cfg(not(feature = "metrics"))]
pub fn inc_packets(_status: &'static str) {}

/// Record a fault handled with `policy`.
#[cfg(not(feature = "metrics"))]
pub fn inc_faults(_policy: FaultPolicy) {}

/// Record a panic raised by a dissector.
#[cfg(not(feature = "metrics"))]
pub fn inc_dissector_panics() {}
