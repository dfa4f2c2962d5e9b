//! Tests for weekly resolution

mod common;

use common::{cb_time, decision_time, et, ob_time, resolve_time, Fixture};
use prospect_auction_core_rs::collaborators::MemoryStandings;
use prospect_auction_core_rs::{
    BidKind, Decision, EngineError, LedgerStore, ResolutionSummary, RosterStore,
};
use std::collections::BTreeMap;

fn winners(summary: &ResolutionSummary) -> &BTreeMap<String, prospect_auction_core_rs::WinningEntry> {
    match summary {
        ResolutionSummary::Resolved { winners, .. } => winners,
        other => panic!("expected a resolved summary, got {other:?}"),
    }
}

#[test]
fn test_scenario_a_uncontested_win_charges_flat_price() {
    let fx = Fixture::new();
    let engine = fx.engine();
    engine.place_bid("ANT", "p1", 15, BidKind::Originating, ob_time()).unwrap();

    let summary = engine.resolve_week(resolve_time()).unwrap();
    let winners = winners(&summary);

    // $10 flat, not the $15 actually bid.
    assert_eq!(winners["p1"].team, "ANT");
    assert_eq!(winners["p1"].price, 10);

    assert_eq!(fx.roster.find_item("p1").unwrap().owner.as_deref(), Some("ANT"));
    assert_eq!(fx.roster.acquisition_tag("p1").as_deref(), Some("PC"));

    let debits = fx.ledger.debits();
    assert_eq!(debits.len(), 1);
    assert_eq!(debits[0].team, "ANT");
    assert_eq!(debits[0].amount, 10);
    assert_eq!(fx.ledger.balance("ANT"), 90);
}

/// OB from ANT ($10), leading challenge from BAT ($20), priority order
/// worst-first [CAT, BAT, ANT]
///
/// Tied challenge amounts cannot be produced through `place_bid` (every
/// challenge must strictly raise), so the equal-amount tie-break half of
/// scenario B lives in the resolution module's unit tests.
fn scenario_b_fixture() -> Fixture {
    let mut fx = Fixture::new();
    fx.standings = MemoryStandings::with_order(vec![
        "CAT".to_string(),
        "BAT".to_string(),
        "ANT".to_string(),
    ]);
    let engine = fx.engine();
    engine.place_bid("ANT", "p1", 10, BidKind::Originating, ob_time()).unwrap();
    engine.place_bid("BAT", "p1", 20, BidKind::Challenge, cb_time()).unwrap();
    fx
}

#[test]
fn test_scenario_b_forfeit_cedes_to_leading_challenger() {
    let fx = scenario_b_fixture();
    let engine = fx.engine();
    engine
        .record_decision("ANT", "p1", Decision::Forfeit, "web", decision_time())
        .unwrap();

    let summary = engine.resolve_week(resolve_time()).unwrap();
    let winners = winners(&summary);
    assert_eq!(winners["p1"].team, "BAT");
    assert_eq!(winners["p1"].price, 20);
}

#[test]
fn test_scenario_b_match_keeps_prospect_at_challenge_price() {
    let fx = scenario_b_fixture();
    let engine = fx.engine();
    engine
        .record_decision("ANT", "p1", Decision::Match, "web", decision_time())
        .unwrap();

    let summary = engine.resolve_week(resolve_time()).unwrap();
    let winners = winners(&summary);
    assert_eq!(winners["p1"].team, "ANT");
    assert_eq!(winners["p1"].price, 20);

    let debits = fx.ledger.debits();
    assert_eq!(debits.len(), 1);
    assert_eq!(debits[0].team, "ANT");
    assert_eq!(debits[0].amount, 20);
}

#[test]
fn test_scenario_b_no_decision_counts_as_forfeit() {
    let fx = scenario_b_fixture();
    let engine = fx.engine();

    let summary = engine.resolve_week(resolve_time()).unwrap();
    assert_eq!(winners(&summary)["p1"].team, "BAT");
}

#[test]
fn test_scenario_c_over_budget_drops_latest_win() {
    let fx = Fixture::new();
    let engine = fx.engine();

    engine.place_bid("ANT", "p1", 10, BidKind::Originating, ob_time()).unwrap();
    engine.place_bid("BAT", "p2", 10, BidKind::Originating, ob_time()).unwrap();
    // DOG wins both tentatively: p1 at $30 (10:00), p2 at $40 (11:00).
    engine.place_bid("DOG", "p1", 30, BidKind::Challenge, et(2026, 4, 9, 10, 0)).unwrap();
    engine.place_bid("DOG", "p2", 40, BidKind::Challenge, et(2026, 4, 9, 11, 0)).unwrap();
    // By Sunday DOG's balance has fallen to $50.
    fx.ledger.set_balance("DOG", 50);

    let summary = engine.resolve_week(resolve_time()).unwrap();
    let winners = winners(&summary);

    // $70 > $50, so the later p2 win is dropped; p2 re-resolves to BAT's
    // now-uncontested originating bid at the flat price.
    assert_eq!(winners["p1"].team, "DOG");
    assert_eq!(winners["p1"].price, 30);
    assert_eq!(winners["p2"].team, "BAT");
    assert_eq!(winners["p2"].price, 10);

    // One debit per team, and DOG stays within its balance.
    let debits = fx.ledger.debits();
    assert_eq!(debits.len(), 2);
    assert_eq!(fx.ledger.balance("DOG"), 20);
    assert_eq!(fx.roster.find_item("p2").unwrap().owner.as_deref(), Some("BAT"));
}

#[test]
fn test_resolution_is_idempotent() {
    let fx = Fixture::new();
    let engine = fx.engine();
    engine.place_bid("ANT", "p1", 15, BidKind::Originating, ob_time()).unwrap();

    let first = engine.resolve_week(resolve_time()).unwrap();
    let second = engine.resolve_week(resolve_time()).unwrap();

    assert_eq!(first, second);
    // No additional debit on the second invocation.
    assert_eq!(fx.ledger.debits().len(), 1);
    assert_eq!(fx.ledger.balance("ANT"), 90);
}

#[test]
fn test_no_bids_and_inactive_outcomes() {
    let fx = Fixture::new();
    let engine = fx.engine();

    assert_eq!(
        engine.resolve_week(resolve_time()).unwrap(),
        ResolutionSummary::NoBids
    );

    // Mid-break Sunday: nothing to do at all.
    assert_eq!(
        engine.resolve_week(et(2026, 7, 19, 14, 0)).unwrap(),
        ResolutionSummary::Inactive
    );
}

#[test]
fn test_post_resolution_affordability_holds() {
    let fx = Fixture::new();
    fx.ledger.set_balance("DOG", 35);
    let engine = fx.engine();

    engine.place_bid("ANT", "p1", 10, BidKind::Originating, ob_time()).unwrap();
    engine.place_bid("BAT", "p2", 10, BidKind::Originating, ob_time()).unwrap();
    engine.place_bid("DOG", "p1", 20, BidKind::Challenge, et(2026, 4, 9, 10, 0)).unwrap();
    engine.place_bid("DOG", "p2", 15, BidKind::Challenge, et(2026, 4, 9, 11, 0)).unwrap();

    // DOG's balance drops between placement and Sunday; the advisory
    // check at placement time no longer holds and resolution must
    // re-enforce against the fresh snapshot.
    fx.ledger.set_balance("DOG", 25);

    let summary = engine.resolve_week(resolve_time()).unwrap();
    let winners = winners(&summary);

    let mut spend_by_team: BTreeMap<&str, i64> = BTreeMap::new();
    for entry in winners.values() {
        *spend_by_team.entry(entry.team.as_str()).or_insert(0) += entry.price;
    }
    assert!(spend_by_team.get("DOG").copied().unwrap_or(0) <= 25);

    // The later p2 win was dropped; p2 fell back to BAT's originating bid.
    assert_eq!(winners["p1"].team, "DOG");
    assert_eq!(winners["p1"].price, 20);
    assert_eq!(winners["p2"].team, "BAT");
    assert_eq!(winners["p2"].price, 10);
}

#[test]
fn test_unsold_prospect_when_no_bidder_remains() {
    let fx = Fixture::new();
    let engine = fx.engine();
    engine.place_bid("ANT", "p1", 15, BidKind::Originating, ob_time()).unwrap();
    // Drained after placement: even the flat $10 is out of reach.
    fx.ledger.set_balance("ANT", 5);

    let summary = engine.resolve_week(resolve_time()).unwrap();
    let winners = winners(&summary);

    // The flat $10 exceeds ANT's $5, and no other bidder exists.
    assert!(winners.is_empty());
    assert!(fx.ledger.debits().is_empty());
    assert!(fx.roster.find_item("p1").unwrap().is_unowned());
}

#[test]
fn test_partial_apply_resumes_without_double_debits() {
    let fx = Fixture::new();
    let engine = fx.engine();

    engine.place_bid("ANT", "p1", 10, BidKind::Originating, ob_time()).unwrap();
    engine.place_bid("BAT", "p2", 10, BidKind::Originating, ob_time()).unwrap();
    engine.place_bid("DOG", "p1", 20, BidKind::Challenge, cb_time()).unwrap();

    // Winners: p1 -> DOG ($20), p2 -> BAT ($10). Teams apply in sorted
    // order, so BAT succeeds first and then DOG's debit faults.
    fx.ledger.fail_debits_for(Some("DOG"));
    let err = engine.resolve_week(resolve_time()).unwrap_err();
    assert!(matches!(err, EngineError::Collaborator(_)));
    assert_eq!(fx.ledger.debits().len(), 1);
    assert_eq!(fx.ledger.debits()[0].team, "BAT");

    // Clear the fault and re-run: BAT is not re-applied, DOG completes.
    fx.ledger.fail_debits_for(None);
    let summary = engine.resolve_week(resolve_time()).unwrap();
    let win = &winners(&summary)["p1"];
    assert_eq!(win.team, "DOG");

    let debits = fx.ledger.debits();
    assert_eq!(debits.len(), 2);
    assert_eq!(debits[1].team, "DOG");
    assert_eq!(debits[1].amount, 20);

    // A third run is a pure no-op.
    engine.resolve_week(resolve_time()).unwrap();
    assert_eq!(fx.ledger.debits().len(), 2);
}

#[test]
fn test_decisions_rejected_after_early_resolution() {
    let fx = Fixture::new();
    let engine = fx.engine();
    engine.place_bid("ANT", "p1", 10, BidKind::Originating, ob_time()).unwrap();
    engine.place_bid("BAT", "p1", 20, BidKind::Challenge, cb_time()).unwrap();

    // Operator runs the Sunday job early, during the decision window.
    engine.resolve_week(decision_time()).unwrap();

    let err = engine
        .record_decision("ANT", "p1", Decision::Match, "web", et(2026, 4, 11, 12, 0))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Rejected(prospect_auction_core_rs::Rejection::WeekResolved)
    ));
}
