//! Deregistration fails closed: no table, list, or clone invokes the handle.

mod stack;

use dissect_core::{DissectorHandle, PacketStatus, Tvb};
use dissect_testing::{CallLog, accepting, delegating};
use rstest::rstest;
use stack::{ETHERTYPE_IP, PROTO_UDP, Stack, frame};

#[rstest]
fn deregistered_dissector_is_unreachable_everywhere() {
    let mut stack = Stack::new();
    let log = CallLog::default();
    let dns = stack.protocol("DNS");
    let handle = stack
        .registry
        .register_dissector("dns", Some(dns), accepting(log.clone(), "dns"))
        .expect("register dns");
    stack.registry.add("udp.port", 53u16, &handle).expect("bind dns");
    stack.registry.add("udp.port", 5353u16, &handle).expect("bind mdns port");
    stack
        .registry
        .register_heuristic("udp", &handle, "DNS over UDP", "dns_udp", Some(dns), true)
        .expect("register heuristic");
    stack.registry.register_postdissector(&handle);

    let removed = stack.registry.deregister_dissector("dns").expect("was registered");
    assert_eq!(removed, handle);
    assert!(!handle.is_live());
    assert!(stack.registry.find_dissector("dns").is_none());
    assert_eq!(stack.registry.lookup("udp.port", 53u16).expect("lookup"), None);
    assert_eq!(stack.registry.lookup("udp.port", 5353u16).expect("lookup"), None);
    assert!(stack.registry.find_heuristic("dns_udp").is_none());
    assert!(stack.registry.heuristic_list("udp").expect("list").is_empty());
    assert!(stack.registry.postdissectors().is_empty());

    let packet = stack
        .registry
        .dissect(&stack.root, 1, Tvb::new(frame(ETHERTYPE_IP, PROTO_UDP, 53, b"q")));
    assert_eq!(packet.context.layers(), &[stack.eth, stack.ip, stack.udp]);
    assert_eq!(log.count("dns"), 0);
}

#[rstest]
fn stale_clone_held_by_a_decoder_is_not_invoked() {
    let mut stack = Stack::new();
    let log = CallLog::default();
    let inner = stack
        .registry
        .register_dissector("inner", None, accepting(log.clone(), "inner"))
        .expect("register inner");
    let outer = stack
        .registry
        .register_dissector("outer", None, delegating(log.clone(), "outer", inner.clone()))
        .expect("register outer");

    stack.registry.deregister_dissector("inner");
    let packet = stack.registry.dissect(&outer, 1, Tvb::from_static(b"abc"));

    assert_eq!(packet.status, PacketStatus::Rejected);
    assert_eq!(log.calls(), ["outer"]);
}

#[rstest]
fn name_can_be_reused_after_deregistration() {
    let mut stack = Stack::new();
    let log = CallLog::default();
    let first = stack
        .registry
        .register_dissector("data", None, accepting(log.clone(), "first"))
        .expect("register first");
    stack.registry.deregister_dissector("data");
    let second = stack
        .registry
        .register_dissector("data", None, accepting(log.clone(), "second"))
        .expect("register second");

    assert_ne!(first, second);
    assert_eq!(stack.registry.find_dissector("data"), Some(second));
}

#[rstest]
fn anonymous_handle_is_withdrawn_with_remove_handle() {
    let mut stack = Stack::new();
    let log = CallLog::default();
    let private = DissectorHandle::anonymous(None, accepting(log.clone(), "private"));
    stack.registry.add("udp.port", 9u16, &private).expect("bind private");
    stack.registry.change("udp.port", 10u16, &private).expect("override");

    stack.registry.remove_handle(&private);

    assert_eq!(stack.registry.table("udp.port").map(|t| t.len()), Some(0));
    assert!(private.is_live(), "the owner still holds a usable handle");
}

#[rstest]
fn purge_restores_the_initial_binding() {
    let mut stack = Stack::new();
    let log = CallLog::default();
    let base = stack
        .registry
        .register_dissector("base", None, accepting(log.clone(), "base"))
        .expect("register base");
    let user = stack
        .registry
        .register_dissector("user", None, accepting(log.clone(), "user"))
        .expect("register user");
    stack.registry.add("udp.port", 9u16, &base).expect("bind base");
    stack.registry.change("udp.port", 9u16, &user).expect("override");

    stack.registry.deregister_dissector("user");

    assert_eq!(stack.registry.lookup("udp.port", 9u16).expect("lookup"), Some(&base));
    assert!(stack.registry.decode_as_changes().is_empty());
}
