//! Tests for fault classification and policy hooks.

use rstest::rstest;

use super::*;
use crate::error::RegistryError;

#[test]
fn fault_policy_default_is_recover() {
    assert_eq!(FaultPolicy::default(), FaultPolicy::Recover);
}

#[rstest]
#[case(DissectError::Bounds(BoundsError::Reported { offset: 0, len: 4, reported: 2 }), FaultPolicy::Recover)]
#[case(DissectError::Bounds(BoundsError::Captured { offset: 0, len: 4, captured: 2 }), FaultPolicy::Abandon)]
#[case(DissectError::Bounds(BoundsError::Fragment { offset: 0, len: 4, available: 2 }), FaultPolicy::Abandon)]
#[case(DissectError::malformed("bad length"), FaultPolicy::Recover)]
#[case(DissectError::DepthExceeded { max: 4 }, FaultPolicy::Recover)]
#[case(DissectError::bug("unknown table"), FaultPolicy::Abandon)]
fn default_policies_follow_fault_class(
    #[case] error: DissectError,
    #[case] expected: FaultPolicy,
) {
    assert_eq!(error.default_fault_policy(), expected);
    assert_eq!(
        DefaultFaultPolicy.fault_policy(&error, &FaultContext::new()),
        expected
    );
    assert_eq!(error.is_recoverable(), expected == FaultPolicy::Recover);
}

#[test]
fn registry_errors_become_bugs() {
    let err = DissectError::from(RegistryError::UnknownTable("udp.port".into()));
    assert_eq!(
        err,
        DissectError::Bug("unknown dissector table `udp.port`".into())
    );
    assert_eq!(err.default_fault_policy(), FaultPolicy::Abandon);
}

#[test]
fn context_builder_sets_fields() {
    let ctx = FaultContext::new()
        .with_frame_number(3)
        .with_protocol("TCP")
        .with_dissector("tcp")
        .with_depth(2);

    assert_eq!(ctx.frame_number, Some(3));
    assert_eq!(ctx.protocol.as_deref(), Some("TCP"));
    assert_eq!(ctx.dissector.as_deref(), Some("tcp"));
    assert_eq!(ctx.depth, 2);
}

#[test]
fn bounds_errors_render_their_limits() {
    let err = DissectError::from(BoundsError::Captured {
        offset: 6,
        len: 4,
        captured: 8,
    });
    assert_eq!(
        err.to_string(),
        "bounds fault: read of 4 bytes at offset 6 exceeds captured length 8"
    );
}
