//! A small Ethernet/IP/UDP-shaped stack shared by the integration tests.
//!
//! Wire layout of a test frame:
//!
//! | bytes | field |
//! |-------|-------|
//! | 0..2  | ethertype (big-endian) |
//! | 2     | IP protocol number |
//! | 3..5  | UDP destination port (big-endian) |
//! | 5..   | payload |

#![allow(dead_code, reason = "each test binary uses a different subset")]

use dissect_core::{
    DissectError,
    DissectorHandle,
    DissectorTable,
    ProtocolId,
    Registry,
    SelectorKind,
    UintWidth,
    dissector_fn,
};

pub struct Stack {
    pub registry: Registry,
    pub eth: ProtocolId,
    pub ip: ProtocolId,
    pub udp: ProtocolId,
    pub root: DissectorHandle,
}

pub const ETHERTYPE_IP: u16 = 0x0800;
pub const PROTO_UDP: u8 = 17;

/// Build a frame with the given header values and payload.
pub fn frame(ethertype: u16, proto: u8, port: u16, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(5 + payload.len());
    bytes.extend_from_slice(&ethertype.to_be_bytes());
    bytes.push(proto);
    bytes.extend_from_slice(&port.to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

impl Stack {
    pub fn new() -> Self { Self::with_registry(Registry::new()) }

    pub fn with_registry(mut registry: Registry) -> Self {
        let eth = registry
            .register_protocol("Ethernet II", "ETH", "eth")
            .expect("register eth");
        let ip = registry
            .register_protocol("Internet Protocol", "IP", "ip")
            .expect("register ip");
        let udp = registry
            .register_protocol("User Datagram Protocol", "UDP", "udp")
            .expect("register udp");

        registry
            .register_table(
                DissectorTable::new("eth.type", SelectorKind::Uint(UintWidth::U16)).with_protocol(eth),
            )
            .expect("register eth.type");
        registry
            .register_table(DissectorTable::new("ip.proto", SelectorKind::Uint(UintWidth::U8)).with_protocol(ip))
            .expect("register ip.proto");
        registry
            .register_table(
                DissectorTable::new("udp.port", SelectorKind::Uint(UintWidth::U16))
                    .with_protocol(udp)
                    .allow_decode_as(),
            )
            .expect("register udp.port");
        registry
            .register_heuristic_list("udp", Some(udp))
            .expect("register udp heuristics");

        let root = registry
            .register_dissector(
                "eth",
                Some(eth),
                dissector_fn(|dx, tvb, pinfo, tree, _data| {
                    let ethertype = tvb.get_u16(0)?;
                    tree.add_protocol("Ethernet II", 2);
                    tree.add_field("Type", format!("{ethertype:#06x}"), 2);
                    let payload = tvb.subset_remaining(2)?;
                    dx.try_uint("eth.type", u32::from(ethertype), &payload, pinfo, tree, None)?;
                    Ok(tvb.captured_len())
                }),
            )
            .expect("register eth dissector");
        let ip_handle = registry
            .register_dissector(
                "ip",
                Some(ip),
                dissector_fn(|dx, tvb, pinfo, tree, _data| {
                    let proto = tvb.get_u8(0)?;
                    tree.add_protocol("Internet Protocol", 1);
                    tree.add_field("Protocol", proto, 1);
                    let payload = tvb.subset_remaining(1)?;
                    dx.try_uint("ip.proto", u32::from(proto), &payload, pinfo, tree, None)?;
                    Ok(tvb.captured_len())
                }),
            )
            .expect("register ip dissector");
        let udp_handle = registry
            .register_dissector(
                "udp",
                Some(udp),
                dissector_fn(|dx, tvb, pinfo, tree, _data| {
                    let port = tvb.get_u16(0)?;
                    tree.add_protocol("User Datagram Protocol", 2);
                    tree.add_field("Destination Port", port, 2);
                    let payload = tvb.subset_remaining(2)?;
                    let by_port = dx.try_uint("udp.port", u32::from(port), &payload, pinfo, tree, None)?;
                    if by_port == 0 && dx.try_heuristic("udp", &payload, pinfo, tree, None)?.is_none() {
                        tree.add_text(format!("Data ({} bytes)", payload.captured_len()));
                    }
                    Ok(tvb.captured_len())
                }),
            )
            .expect("register udp dissector");

        registry
            .add("eth.type", ETHERTYPE_IP, &ip_handle)
            .expect("bind ip");
        registry
            .add("ip.proto", PROTO_UDP, &udp_handle)
            .expect("bind udp");
        registry.register_dependency("eth", "ip");
        registry.register_dependency("ip", "udp");

        Self {
            registry,
            eth,
            ip,
            udp,
            root,
        }
    }

    /// Register a payload protocol and return its id.
    pub fn protocol(&mut self, short_name: &'static str) -> ProtocolId {
        let filter = short_name.to_lowercase();
        let id = self
            .registry
            .register_protocol(short_name, short_name, &filter)
            .expect("register payload protocol");
        self.registry.register_dependency("udp", &filter);
        id
    }
}

/// Error used by decoders that find a payload they cannot parse.
pub fn bad_payload() -> DissectError { DissectError::malformed("bad payload") }
