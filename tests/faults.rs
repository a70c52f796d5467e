//! Fault containment: recovered faults, abandoned packets, and panics.

mod stack;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use dissect_core::{
    BoundsError,
    DissectConfig,
    DissectError,
    DissectorHandle,
    FaultPolicy,
    FaultPolicyHook,
    PacketStatus,
    Registry,
    Tvb,
    dissector_fn,
    fault::FaultContext,
    tree::ItemKind,
};
use dissect_testing::{CallLog, LoggerHandle, accepting, faulting, logger, panicking};
use rstest::rstest;
use serial_test::serial;
use stack::{ETHERTYPE_IP, PROTO_UDP, Stack, bad_payload, frame};
use tracing_test::traced_test;

const DNS_PORT: u16 = 53;
const ECHO_PORT: u16 = 7;

/// Bind `dissector` to the DNS port of a fresh stack built on `registry`.
fn stack_with_dns(registry: Registry, dissector: impl dissect_core::Dissector + 'static) -> Stack {
    let mut stack = Stack::with_registry(registry);
    let dns = stack.protocol("DNS");
    let handle = stack
        .registry
        .register_dissector("dns", Some(dns), dissector)
        .expect("register dns");
    stack
        .registry
        .add("udp.port", DNS_PORT, &handle)
        .expect("bind dns");
    stack
}

fn dissect(stack: &Stack, frame_number: u64, port: u16) -> dissect_core::DissectedPacket {
    stack
        .registry
        .dissect(&stack.root, frame_number, Tvb::new(frame(ETHERTYPE_IP, PROTO_UDP, port, b"abcd")))
}

fn truncated() -> DissectError {
    DissectError::Bounds(BoundsError::Captured {
        offset: 2,
        len: 4,
        captured: 4,
    })
}

#[rstest]
fn truncated_capture_abandons_the_packet() {
    let log = CallLog::default();
    let stack = stack_with_dns(Registry::new(), faulting(log.clone(), "dns", truncated()));

    let packet = dissect(&stack, 1, DNS_PORT);

    assert_eq!(
        packet.status,
        PacketStatus::Abandoned {
            reason: truncated().to_string()
        }
    );
    let labels: Vec<_> = packet.tree.items().iter().map(|i| i.label.as_str()).collect();
    assert!(labels.contains(&"User Datagram Protocol"), "earlier layers are kept");
    let last = packet.tree.items().last().expect("malformed marker");
    assert_eq!(last.kind, ItemKind::Malformed);
    assert_eq!(last.label, "[Malformed Packet: DNS]");
    assert_eq!(packet.tree.malformed_count(), 1);
    assert_eq!(packet.context.current_proto(), None);
}

#[rstest]
fn reported_overrun_is_recovered_in_place() {
    let log = CallLog::default();
    let error = DissectError::Bounds(BoundsError::Reported {
        offset: 0,
        len: 8,
        reported: 4,
    });
    let stack = stack_with_dns(Registry::new(), faulting(log.clone(), "dns", error));

    let packet = dissect(&stack, 1, DNS_PORT);

    assert_eq!(packet.status, PacketStatus::Accepted { consumed: 9 });
    let malformed: Vec<_> = packet
        .tree
        .items()
        .iter()
        .filter(|i| i.kind == ItemKind::Malformed)
        .map(|i| (i.label.as_str(), i.depth, i.length))
        .collect();
    assert_eq!(malformed, [("[Malformed Packet: DNS]", 4, 4)]);
    assert_eq!(packet.context.layers().len(), 4);
}

#[rstest]
fn table_misuse_inside_a_dissector_is_a_bug() {
    let stack = stack_with_dns(
        Registry::new(),
        dissector_fn(|dx, tvb, pinfo, tree, _data| dx.try_uint("no.such.table", 1, tvb, pinfo, tree, None)),
    );

    let packet = dissect(&stack, 1, DNS_PORT);

    let PacketStatus::Abandoned { reason } = &packet.status else {
        panic!("expected abandoned packet, got {:?}", packet.status);
    };
    assert!(reason.contains("no.such.table"), "reason: {reason}");
}

#[rstest]
fn panic_is_contained_to_one_packet() {
    let log = CallLog::default();
    let mut stack = stack_with_dns(Registry::new(), panicking(log.clone(), "dns"));
    let echo = stack.protocol("ECHO");
    let echo_handle = stack
        .registry
        .register_dissector("echo", Some(echo), accepting(log.clone(), "echo"))
        .expect("register echo");
    stack
        .registry
        .add("udp.port", ECHO_PORT, &echo_handle)
        .expect("bind echo");

    let first = dissect(&stack, 1, DNS_PORT);
    let PacketStatus::Abandoned { reason } = &first.status else {
        panic!("expected abandoned packet, got {:?}", first.status);
    };
    assert!(reason.contains("dns exploded"), "reason: {reason}");
    assert!(first.tree.is_malformed());

    let second = dissect(&stack, 2, ECHO_PORT);
    assert_eq!(second.status, PacketStatus::Accepted { consumed: 9 });
    assert!(!second.tree.is_malformed());
    assert_eq!(log.calls(), ["dns", "echo"]);
}

#[derive(Default)]
struct AbandonAll {
    adjudicated: AtomicUsize,
}

impl FaultPolicyHook for AbandonAll {
    fn fault_policy(&self, _error: &DissectError, _ctx: &FaultContext) -> FaultPolicy { FaultPolicy::Abandon }

    fn on_fault(&self, _error: &DissectError, ctx: &FaultContext, _policy: FaultPolicy) {
        assert_eq!(ctx.dissector.as_deref(), Some("dns"));
        assert_eq!(ctx.protocol.as_deref(), Some("DNS"));
        self.adjudicated.fetch_add(1, Ordering::SeqCst);
    }
}

#[rstest]
fn custom_hook_decides_once_per_fault() {
    let hook = Arc::new(AbandonAll::default());
    let registry = Registry::new().with_fault_hook(hook.clone());
    let log = CallLog::default();
    let stack = stack_with_dns(registry, faulting(log, "dns", bad_payload()));

    let packet = dissect(&stack, 1, DNS_PORT);

    assert!(packet.status.is_abandoned());
    assert_eq!(hook.adjudicated.load(Ordering::SeqCst), 1);
}

#[rstest]
#[serial]
fn abandoned_packet_is_logged(mut logger: LoggerHandle) {
    let log = CallLog::default();
    let stack = stack_with_dns(Registry::new(), faulting(log, "dns", truncated()));

    let _ = dissect(&stack, 7, DNS_PORT);

    let messages = logger.messages();
    assert!(
        messages.iter().any(|m| m.contains("packet abandoned: frame=7,")),
        "messages: {messages:?}"
    );
}

#[rstest]
#[serial]
fn recovered_fault_is_logged_as_warning(mut logger: LoggerHandle) {
    let log = CallLog::default();
    let stack = stack_with_dns(Registry::new(), faulting(log, "dns", bad_payload()));

    let packet = dissect(&stack, 3, DNS_PORT);
    assert!(!packet.status.is_abandoned());

    let warnings: Vec<_> = std::iter::from_fn(|| logger.pop())
        .filter(|r| r.level() == log::Level::Warn && r.args().contains("frame=3,"))
        .map(|r| r.args().to_owned())
        .collect();
    assert_eq!(warnings.len(), 1, "warnings: {warnings:?}");
    assert!(warnings[0].contains("recovered dissector fault: frame=3"));
    assert!(warnings[0].contains("dissector=dns"));
}

#[rstest]
#[serial]
fn recovered_fault_logging_can_be_silenced(mut logger: LoggerHandle) {
    let log = CallLog::default();
    let registry = Registry::with_config(DissectConfig::default().log_recovered_faults(false));
    let stack = stack_with_dns(registry, faulting(log, "dns", bad_payload()));

    let _ = dissect(&stack, 21, DNS_PORT);

    assert!(
        !logger
            .messages()
            .iter()
            .any(|m| m.contains("recovered dissector fault: frame=21,"))
    );
}

#[test]
#[serial]
#[traced_test]
fn abandoned_packet_emits_a_tracing_event() {
    let handle = DissectorHandle::anonymous(
        None,
        dissector_fn(|_dx, _tvb, _pinfo, _tree, _data| Err(DissectError::bug("inconsistent state"))),
    );
    let registry = Registry::new();

    let packet = registry.dissect(&handle, 11, Tvb::from_static(b"x"));

    assert!(packet.status.is_abandoned());
    assert!(logs_contain("packet abandoned"));
    assert!(logs_contain("inconsistent state"));
}
