//! Weekly allocation logic
//!
//! Pure functions implementing the two computation phases of Sunday
//! processing:
//!
//! 1. **Tentative winners** — per prospect, ignoring budgets: an
//!    uncontested originating bid wins at the flat minimum originating
//!    amount; otherwise the leading challenge (max amount, priority-order
//!    tie-break) wins unless the originating manager recorded a match, in
//!    which case the originating team pays the leading challenge amount.
//! 2. **Affordability enforcement** — while any team's tentative spend
//!    exceeds its balance, its most recently submitted win is removed and
//!    that one prospect is re-resolved without the removed team.
//!
//! Applying the final allocation to the roster and ledger is the engine's
//! job (`AuctionEngine::resolve_week`); nothing here touches a
//! collaborator or the store.

use crate::models::bid::Bid;
use crate::models::decision::{Decision, MatchDecision};
use crate::models::week::WinningEntry;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// How a tentative win was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinSource {
    /// Originating bid with no challenges; flat minimum price
    Uncontested,

    /// Originating manager matched the leading challenge
    MatchedChallenge,

    /// Leading challenge won outright
    ChallengeWin,
}

/// A per-prospect winner before affordability enforcement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TentativeWin {
    /// Winning team
    pub team: String,

    /// Price the winner pays
    pub price: i64,

    /// Submission instant of the bid that produced this win: the
    /// originating bid for uncontested wins, the leading challenge
    /// otherwise. Drives the drop-latest-first affordability rule.
    pub submitted_at: DateTime<Utc>,

    /// How the win came about
    pub source: WinSource,
}

impl TentativeWin {
    /// Collapse to the persisted (team, price) form
    pub fn to_entry(&self) -> WinningEntry {
        WinningEntry {
            team: self.team.clone(),
            price: self.price,
        }
    }
}

/// Outcome of `resolve_week`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionSummary {
    /// Auctions are not active this week; nothing to resolve
    Inactive,

    /// The week is active but nobody bid
    NoBids,

    /// Winners were determined (possibly on a prior invocation)
    Resolved {
        week_start: NaiveDate,
        winners: BTreeMap<String, WinningEntry>,
    },
}

/// Compute the winner for a single prospect from its surviving bids
///
/// `bids` and `decisions` must already be filtered to this prospect (and,
/// during affordability enforcement, stripped of removed teams). Returns
/// `None` when no bid remains.
pub fn tentative_winner_for_prospect(
    bids: &[&Bid],
    decisions: &[&MatchDecision],
    priority_index: &HashMap<String, usize>,
    min_originating_amount: i64,
) -> Option<TentativeWin> {
    let ob = bids.iter().copied().find(|b| b.is_originating());

    let leading = bids
        .iter()
        .copied()
        .filter(|b| b.is_challenge())
        .min_by(|a, b| {
            // Highest amount first; ties go to the worst-standing team,
            // then to the lexically smaller team id for full determinism.
            let rank = |bid: &Bid| {
                priority_index
                    .get(bid.team())
                    .copied()
                    .unwrap_or(usize::MAX)
            };
            b.amount()
                .cmp(&a.amount())
                .then_with(|| rank(a).cmp(&rank(b)))
                .then_with(|| a.team().cmp(b.team()))
        });

    match (ob, leading) {
        (None, None) => None,

        // Uncontested originating bid: flat minimum price, not the amount
        // actually bid. Preserved from the league's historical behavior;
        // flagged as an open product question in DESIGN.md.
        (Some(ob), None) => Some(TentativeWin {
            team: ob.team().to_string(),
            price: min_originating_amount,
            submitted_at: ob.submitted_at(),
            source: WinSource::Uncontested,
        }),

        (ob, Some(leading)) => {
            let matched = ob.is_some_and(|ob| {
                decisions
                    .iter()
                    .find(|d| d.team() == ob.team())
                    .map(|d| d.decision())
                    == Some(Decision::Match)
            });
            if matched {
                // ob is Some whenever matched is true.
                let ob = ob.unwrap();
                Some(TentativeWin {
                    team: ob.team().to_string(),
                    price: leading.amount(),
                    submitted_at: leading.submitted_at(),
                    source: WinSource::MatchedChallenge,
                })
            } else {
                Some(TentativeWin {
                    team: leading.team().to_string(),
                    price: leading.amount(),
                    submitted_at: leading.submitted_at(),
                    source: WinSource::ChallengeWin,
                })
            }
        }
    }
}

/// Phase A: tentative winners for every prospect with at least one bid
pub fn compute_tentative_winners(
    bids: &[Bid],
    decisions: &[MatchDecision],
    priority_index: &HashMap<String, usize>,
    min_originating_amount: i64,
) -> BTreeMap<String, TentativeWin> {
    let mut prospect_ids: BTreeSet<&str> = BTreeSet::new();
    for bid in bids {
        prospect_ids.insert(bid.prospect_id());
    }

    let mut winners = BTreeMap::new();
    for pid in prospect_ids {
        let pbids: Vec<&Bid> = bids.iter().filter(|b| b.prospect_id() == pid).collect();
        let pdecisions: Vec<&MatchDecision> = decisions
            .iter()
            .filter(|d| d.prospect_id() == pid)
            .collect();
        if let Some(win) = tentative_winner_for_prospect(
            &pbids,
            &pdecisions,
            priority_index,
            min_originating_amount,
        ) {
            winners.insert(pid.to_string(), win);
        }
    }
    winners
}

/// Phase B: drop-and-re-resolve until every team can afford its wins
///
/// `balances` is a snapshot taken once at resolution start, so the whole
/// fixed point evaluates against consistent figures. Each iteration
/// permanently removes one (prospect, team) pair from contention, which
/// bounds the loop by the number of bids; the explicit cap below enforces
/// that bound.
pub fn enforce_affordability(
    winners: &mut BTreeMap<String, TentativeWin>,
    bids: &[Bid],
    decisions: &[MatchDecision],
    priority_index: &HashMap<String, usize>,
    balances: &HashMap<String, i64>,
    min_originating_amount: i64,
) {
    let mut removed: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    let max_rounds = bids.len();
    let mut rounds = 0usize;

    while let Some(team) = first_over_budget(winners, balances) {
        if rounds >= max_rounds {
            tracing::error!(team = %team, "affordability loop hit its bid-count bound");
            break;
        }
        rounds += 1;

        // Most recent win for the over-committed team, prospect id as the
        // final tie-break.
        let dropped_pid = winners
            .iter()
            .filter(|(_, win)| win.team == team)
            .max_by(|(pid_a, a), (pid_b, b)| {
                a.submitted_at
                    .cmp(&b.submitted_at)
                    .then_with(|| pid_a.cmp(pid_b))
            })
            .map(|(pid, _)| pid.clone());
        // first_over_budget only names teams that hold at least one win.
        let pid = dropped_pid.unwrap();

        winners.remove(&pid);
        let removed_teams = removed.entry(pid.clone()).or_default();
        removed_teams.insert(team);

        // Re-run the per-prospect logic with the removed teams' bids and
        // decisions excluded. No surviving bid leaves the prospect unsold.
        let pbids: Vec<&Bid> = bids
            .iter()
            .filter(|b| b.prospect_id() == pid && !removed_teams.contains(b.team()))
            .collect();
        let pdecisions: Vec<&MatchDecision> = decisions
            .iter()
            .filter(|d| d.prospect_id() == pid && !removed_teams.contains(d.team()))
            .collect();
        if let Some(win) = tentative_winner_for_prospect(
            &pbids,
            &pdecisions,
            priority_index,
            min_originating_amount,
        ) {
            winners.insert(pid, win);
        }
    }
}

/// Alphabetically first team whose tentative spend exceeds its balance
fn first_over_budget(
    winners: &BTreeMap<String, TentativeWin>,
    balances: &HashMap<String, i64>,
) -> Option<String> {
    let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
    for win in winners.values() {
        *totals.entry(win.team.as_str()).or_insert(0) += win.price;
    }
    totals
        .into_iter()
        .find(|(team, total)| *total > balances.get(*team).copied().unwrap_or(0))
        .map(|(team, _)| team.to_string())
}
