//! Tests for match / forfeit decision recording

mod common;

use common::{cb_time, decision_time, ob_time, Fixture};
use prospect_auction_core_rs::{BidKind, Decision, EngineError, Rejection};

fn rejection(err: EngineError) -> Rejection {
    match err {
        EngineError::Rejected(rejection) => rejection,
        other => panic!("expected a rejection, got {other:?}"),
    }
}

/// OB from ANT on p1, challenge from BAT
fn contested_fixture() -> Fixture {
    let fx = Fixture::new();
    let engine = fx.engine();
    engine.place_bid("ANT", "p1", 10, BidKind::Originating, ob_time()).unwrap();
    engine.place_bid("BAT", "p1", 20, BidKind::Challenge, cb_time()).unwrap();
    fx
}

#[test]
fn test_match_recorded() {
    let fx = contested_fixture();
    let record = fx
        .engine()
        .record_decision("ant", "p1", Decision::Match, "discord", decision_time())
        .unwrap();

    assert_eq!(record.team(), "ANT");
    assert_eq!(record.decision(), Decision::Match);
    assert_eq!(record.source(), "discord");
}

#[test]
fn test_decisions_only_on_saturday() {
    let fx = contested_fixture();
    let err = fx
        .engine()
        .record_decision("ANT", "p1", Decision::Match, "web", cb_time())
        .unwrap_err();
    assert_eq!(rejection(err), Rejection::DecisionWindowClosed);
}

#[test]
fn test_only_originating_manager_may_decide() {
    let fx = contested_fixture();
    let err = fx
        .engine()
        .record_decision("BAT", "p1", Decision::Forfeit, "web", decision_time())
        .unwrap_err();
    assert_eq!(rejection(err), Rejection::NotOriginatingManager);
}

#[test]
fn test_decision_requires_an_originating_bid() {
    let fx = contested_fixture();
    let err = fx
        .engine()
        .record_decision("CAT", "p2", Decision::Forfeit, "web", decision_time())
        .unwrap_err();
    assert_eq!(rejection(err), Rejection::NothingToDecide);
}

#[test]
fn test_decisions_are_final() {
    let fx = contested_fixture();
    let engine = fx.engine();
    engine
        .record_decision("ANT", "p1", Decision::Forfeit, "discord", decision_time())
        .unwrap();

    // No revision, not even to the same value.
    let err = engine
        .record_decision("ANT", "p1", Decision::Match, "web", decision_time())
        .unwrap_err();
    assert_eq!(rejection(err), Rejection::AlreadyDecided);
}
