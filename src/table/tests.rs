use rstest::{fixture, rstest};

use super::*;
use crate::handle::{DataDissector, DissectorHandle};

fn handle() -> DissectorHandle { DissectorHandle::anonymous(None, DataDissector) }

#[fixture]
fn ports() -> DissectorTable {
    DissectorTable::new("udp.port", SelectorKind::Uint(UintWidth::U16)).allow_decode_as()
}

#[rstest]
fn add_binds_both_sides(mut ports: DissectorTable) {
    let h = handle();
    ports.add(53u16.into(), h.clone()).expect("add");
    assert_eq!(ports.lookup(53u16), Ok(Some(&h)));
    assert_eq!(ports.lookup_default(53u16), Ok(Some(&h)));
    assert_eq!(ports.candidates(), &[h]);
}

#[rstest]
fn candidates_are_deduplicated(mut ports: DissectorTable) {
    let h = handle();
    ports.add(53u16.into(), h.clone()).expect("add");
    ports.add(5353u16.into(), h.clone()).expect("add");
    assert_eq!(ports.candidates().len(), 1);
}

#[rstest]
fn candidates_are_not_tracked_without_decode_as() {
    let mut table = DissectorTable::new("ip.proto", SelectorKind::Uint(UintWidth::U8));
    table.add(17u8.into(), handle()).expect("add");
    assert!(table.candidates().is_empty());
}

#[rstest]
fn change_then_reset_restores_initial(mut ports: DissectorTable) {
    let (h1, h2) = (handle(), handle());
    ports.add(7u16.into(), h1.clone()).expect("add");
    ports.change(7u16.into(), Some(h2.clone())).expect("change");
    assert_eq!(ports.lookup(7u16), Ok(Some(&h2)));
    assert_eq!(ports.lookup_default(7u16), Ok(Some(&h1)));
    assert!(ports.binding(7u16).expect("binding").is_some_and(Binding::is_changed));

    ports.reset(7u16.into()).expect("reset");
    assert_eq!(ports.lookup(7u16), Ok(Some(&h1)));
}

#[rstest]
fn change_without_binding_resets_to_nothing(mut ports: DissectorTable) {
    ports.change(9u16.into(), Some(handle())).expect("change");
    assert!(ports.lookup(9u16).expect("lookup").is_some());
    assert_eq!(ports.lookup_default(9u16), Ok(None));

    ports.reset(9u16.into()).expect("reset");
    assert_eq!(ports.binding(9u16), Ok(None));
}

#[rstest]
fn clearing_an_unbound_selector_creates_nothing(mut ports: DissectorTable) {
    ports.change(9u16.into(), None).expect("change");
    assert!(ports.is_empty());
}

#[rstest]
fn clearing_a_bound_selector_keeps_initial(mut ports: DissectorTable) {
    let h = handle();
    ports.add(9u16.into(), h.clone()).expect("add");
    ports.change(9u16.into(), None).expect("change");
    assert_eq!(ports.lookup(9u16), Ok(None));
    ports.reset(9u16.into()).expect("reset");
    assert_eq!(ports.lookup(9u16), Ok(Some(&h)));
}

#[rstest]
fn delete_is_unconditional_and_reset_after_it_is_a_no_op(mut ports: DissectorTable) {
    ports.add(7u16.into(), handle()).expect("add");
    assert_eq!(ports.delete(7u16.into()), Ok(true));
    assert_eq!(ports.delete(7u16.into()), Ok(false));
    ports.reset(7u16.into()).expect("reset");
    assert_eq!(ports.lookup(7u16), Ok(None));
}

#[rstest]
fn delete_all_removes_current_routes(mut ports: DissectorTable) {
    let (h1, h2) = (handle(), handle());
    ports.add(1u16.into(), h1.clone()).expect("add");
    ports.add(2u16.into(), h1.clone()).expect("add");
    ports.add(3u16.into(), h2.clone()).expect("add");
    assert_eq!(ports.delete_all(&h1), 2);
    assert_eq!(ports.len(), 1);
    assert_eq!(ports.lookup(3u16), Ok(Some(&h2)));
}

#[rstest]
fn purge_reverts_to_initial_and_drops_empty_bindings(mut ports: DissectorTable) {
    let (h1, h2) = (handle(), handle());
    ports.add(1u16.into(), h1.clone()).expect("add");
    ports.change(1u16.into(), Some(h2.clone())).expect("change");
    ports.add(2u16.into(), h2.clone()).expect("add");
    ports.add_candidate(&h2);

    ports.purge(&h2);

    assert_eq!(ports.lookup(1u16), Ok(Some(&h1)));
    assert_eq!(ports.binding(2u16), Ok(None));
    assert!(!ports.candidates().contains(&h2));
}

#[rstest]
fn reset_changed_only_touches_changed_bindings(mut ports: DissectorTable) {
    let (h1, h2) = (handle(), handle());
    ports.add(1u16.into(), h1.clone()).expect("add");
    ports.add(2u16.into(), h1.clone()).expect("add");
    ports.change(2u16.into(), Some(h2.clone())).expect("change");
    ports.change(3u16.into(), Some(h2)).expect("change");

    assert_eq!(ports.reset_changed(), 2);
    assert_eq!(ports.lookup(2u16), Ok(Some(&h1)));
    assert_eq!(ports.binding(3u16), Ok(None));
    assert_eq!(ports.len(), 2);
}

#[rstest]
#[case(SelectorKind::Uint(UintWidth::U8), Selector::Uint(256))]
#[case(SelectorKind::Uint(UintWidth::U24), Selector::Uint(0x0100_0000))]
fn wide_integers_are_out_of_range(#[case] kind: SelectorKind, #[case] selector: Selector) {
    let table = DissectorTable::new("t", kind);
    assert!(matches!(
        table.normalize(selector),
        Err(RegistryError::SelectorOutOfRange { .. })
    ));
}

#[rstest]
#[case(SelectorKind::Uint(UintWidth::U16), Selector::from("http"))]
#[case(SelectorKind::String(StringCase::Sensitive), Selector::Uint(80))]
#[case(SelectorKind::Guid, Selector::from("x"))]
fn mismatched_kinds_are_rejected(#[case] kind: SelectorKind, #[case] selector: Selector) {
    let table = DissectorTable::new("t", kind);
    let err = table.normalize(selector).expect_err("kind mismatch");
    assert!(matches!(err, RegistryError::SelectorKindMismatch { expected, .. } if expected == kind));
}

#[rstest]
fn case_insensitive_tables_fold_keys() {
    let mut table = DissectorTable::new("media_type", SelectorKind::String(StringCase::Insensitive));
    let h = handle();
    table.add("Application/JSON".into(), h.clone()).expect("add");
    assert_eq!(table.lookup("application/json"), Ok(Some(&h)));

    let mut exact = DissectorTable::new("tag", SelectorKind::String(StringCase::Sensitive));
    exact.add("ABC".into(), h).expect("add");
    assert_eq!(exact.lookup("abc"), Ok(None));
}

#[rstest]
fn guid_tables_route_by_guid() {
    let guid: Guid = "4b324fc8-1670-01d3-1278-5a47bf6ee188"
        .parse()
        .expect("valid guid");
    let mut table = DissectorTable::new("dcerpc.uuid", SelectorKind::Guid);
    let h = handle();
    table.add(guid.into(), h.clone()).expect("add");
    assert_eq!(table.lookup(guid), Ok(Some(&h)));
}

#[rstest]
fn guid_byte_orders() {
    let bytes = [
        0xc8, 0x4f, 0x32, 0x4b, 0x70, 0x16, 0xd3, 0x01, 0x12, 0x78, 0x5a, 0x47, 0xbf, 0x6e, 0xe1, 0x88,
    ];
    let le = Guid::from_bytes_le(bytes);
    assert_eq!(le.to_string(), "4b324fc8-1670-01d3-1278-5a47bf6ee188");
    let be = Guid::from_bytes_be(bytes);
    assert_eq!(be.data1, 0xc84f_324b);
    assert_eq!(be.data4, le.data4);
}

#[rstest]
#[case("")]
#[case("4b324fc8-1670-01d3-1278")]
#[case("4b324fc8-1670-01d3-1278-5a47bf6ee18")]
#[case("zb324fc8-1670-01d3-1278-5a47bf6ee188")]
#[case("+b324fc8-1670-01d3-1278-5a47bf6ee188")]
#[case("4b324fc8-+670-01d3-1278-5a47bf6ee188")]
#[case("4b324fc8-1670-01d3-+278-5a47bf6ee188")]
fn malformed_guids_do_not_parse(#[case] text: &str) {
    assert!(text.parse::<Guid>().is_err());
}

#[rstest]
#[case(SelectorKind::Uint(UintWidth::U16), "uint16")]
#[case(SelectorKind::Uint(UintWidth::U24), "uint24")]
#[case(SelectorKind::String(StringCase::Insensitive), "case-insensitive string")]
#[case(SelectorKind::Guid, "guid")]
fn selector_kinds_render(#[case] kind: SelectorKind, #[case] expected: &str) {
    assert_eq!(kind.to_string(), expected);
}
