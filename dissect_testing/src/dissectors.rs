//! Canned dissectors that record when they run.

use std::sync::{Arc, Mutex, MutexGuard};

use dissect_core::{DissectError, Dissector, DissectorHandle, dissector_fn};

/// Shared, ordered record of dissector invocations.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    /// Append `entry`.
    pub fn record(&self, entry: impl Into<String>) { self.lock().push(entry.into()); }

    /// Snapshot of every entry in invocation order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> { self.lock().clone() }

    /// Number of entries equal to `name`.
    #[must_use]
    pub fn count(&self, name: &str) -> usize { self.lock().iter().filter(|c| c.as_str() == name).count() }

    /// Forget every entry.
    pub fn clear(&self) { self.lock().clear(); }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> { self.0.lock().expect("call log poisoned") }
}

/// Dissector that records `name` and consumes the whole view.
pub fn accepting(log: CallLog, name: &'static str) -> impl Dissector {
    dissector_fn(move |_dx, tvb, _pinfo, tree, _data| {
        log.record(name);
        tree.add_protocol(name, tvb.captured_len());
        Ok(tvb.captured_len())
    })
}

/// Dissector that records `name` and consumes exactly `consumed` bytes.
pub fn consuming(log: CallLog, name: &'static str, consumed: usize) -> impl Dissector {
    dissector_fn(move |_dx, _tvb, _pinfo, tree, _data| {
        log.record(name);
        tree.add_protocol(name, consumed);
        Ok(consumed)
    })
}

/// Dissector that records `name` and rejects the data.
pub fn rejecting(log: CallLog, name: &'static str) -> impl Dissector {
    dissector_fn(move |_dx, _tvb, _pinfo, _tree, _data| {
        log.record(name);
        Ok(0)
    })
}

/// Dissector that records `name` and fails with `error`.
pub fn faulting(log: CallLog, name: &'static str, error: DissectError) -> impl Dissector {
    dissector_fn(move |_dx, _tvb, _pinfo, _tree, _data| {
        log.record(name);
        Err(error.clone())
    })
}

/// Dissector that records `name` and then panics with a message naming it.
pub fn panicking(log: CallLog, name: &'static str) -> impl Dissector {
    dissector_fn(move |_dx, _tvb, _pinfo, _tree, _data| {
        log.record(name);
        panic!("{name} exploded")
    })
}

/// Dissector that records `name`, hands the whole view to `child`, and
/// returns what the child consumed.
pub fn delegating(log: CallLog, name: &'static str, child: DissectorHandle) -> impl Dissector {
    dissector_fn(move |dx, tvb, pinfo, tree, _data| {
        log.record(name);
        tree.add_protocol(name, 0);
        dx.call_dissector_only(&child, tvb, pinfo, tree, None)
    })
}
