//! Tests for per-packet state bookkeeping.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn pinfo() -> PacketContext { PacketContext::new(1) }

#[rstest]
fn enter_and_restore_round_trip_engine_fields(mut pinfo: PacketContext) {
    pinfo.set_can_desegment(2);
    let outer = pinfo.enter(Some(Arc::from("TCP")));
    assert_eq!(pinfo.current_proto(), Some("TCP"));
    assert_eq!(pinfo.can_desegment(), 1);
    assert_eq!(pinfo.saved_can_desegment(), 2);
    assert_eq!(pinfo.depth(), 1);

    let inner = pinfo.enter(None);
    assert_eq!(pinfo.current_proto(), Some("TCP"), "no protocol keeps the name");
    assert_eq!(pinfo.can_desegment(), 0);

    let floor = pinfo.enter(Some(Arc::from("HTTP")));
    assert_eq!(pinfo.can_desegment(), 0, "counter is floored at zero");
    pinfo.restore(floor);
    pinfo.restore(inner);
    pinfo.restore(outer);

    assert_eq!(pinfo.current_proto(), None);
    assert_eq!(pinfo.can_desegment(), 2);
    assert_eq!(pinfo.depth(), 0);
}

#[rstest]
fn desegment_requests_need_an_offer(mut pinfo: PacketContext) {
    assert!(!pinfo.request_desegment(0, 10));
    assert_eq!(pinfo.take_desegment_request(), None);

    pinfo.set_can_desegment(1);
    assert!(pinfo.request_desegment(4, 10));
    assert_eq!(
        pinfo.take_desegment_request(),
        Some(DesegmentRequest { offset: 4, len: 10 })
    );
    assert_eq!(pinfo.take_desegment_request(), None);
}

#[rstest]
fn data_sources_are_append_only(mut pinfo: PacketContext) {
    pinfo.add_data_source("Frame", Tvb::from_static(b"abcd"));
    pinfo.add_data_source("Reassembled TCP", Tvb::from_static(b"abcdefgh"));

    let names: Vec<_> = pinfo.data_sources().iter().map(DataSource::name).collect();
    assert_eq!(names, vec!["Frame", "Reassembled TCP"]);
    assert_eq!(pinfo.data_sources()[1].tvb().captured_len(), 8);
}

#[rstest]
fn reset_keeps_layers_and_sources(mut pinfo: PacketContext) {
    let mut protocols = crate::protocol::ProtocolTable::default();
    let eth = protocols.register("Ethernet", "ETH", "eth").expect("register eth");
    pinfo.push_layer(eth);
    pinfo.add_data_source("Frame", Tvb::from_static(b"x"));
    let _ = pinfo.enter(Some(Arc::from("ETH")));
    pinfo.replace_match_uint(Some(80));

    pinfo.reset_dispatch_state();

    assert_eq!(pinfo.current_proto(), None);
    assert_eq!(pinfo.match_uint(), None);
    assert_eq!(pinfo.depth(), 0);
    assert!(pinfo.contains_layer(eth));
    assert_eq!(pinfo.data_sources().len(), 1);
}
