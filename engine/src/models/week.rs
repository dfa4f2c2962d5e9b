//! The per-week auction record
//!
//! One [`AuctionWeek`] exists per calendar week, keyed by its Monday date.
//! It owns the submission-ordered bid list, the decision list, the weekly
//! priority order, a snapshot of the season schedule in effect when the
//! week was created, and (after Sunday processing) the resolution outcome.
//!
//! # Critical Invariants
//!
//! 1. At most one originating bid per team and at most one per prospect
//! 2. Every challenge bid references a prospect with exactly one
//!    originating bid from a different team
//! 3. At most one challenge bid per (team, prospect, local date)
//! 4. At most one decision per (team, prospect)
//! 5. Bids and decisions are append-only; resolution is the only other
//!    mutation and happens at most once
//!
//! The record itself only answers queries; the invariants are enforced by
//! the validation sequence in the engine before anything is appended.

use crate::core::schedule::{Phase, SeasonSchedule};
use crate::models::bid::{Bid, BidKind};
use crate::models::decision::{Decision, MatchDecision};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A final winning (team, price) pair for one prospect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningEntry {
    /// Winning team
    pub team: String,

    /// Price charged at resolution (whole currency units)
    pub price: i64,
}

/// Outcome of the weekly resolution pass, stored on the week record
///
/// `applied_teams` is the idempotency key for Phase C: a team appears here
/// only after its roster assignments and its single ledger debit have both
/// succeeded, so a retry after a partial failure never re-applies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekResolution {
    winners: BTreeMap<String, WinningEntry>,
    applied_teams: BTreeSet<String>,
    completed: bool,
    resolved_at: DateTime<Utc>,
}

impl WeekResolution {
    /// Record a freshly computed allocation, with no teams applied yet
    pub fn new(winners: BTreeMap<String, WinningEntry>, resolved_at: DateTime<Utc>) -> Self {
        Self {
            winners,
            applied_teams: BTreeSet::new(),
            completed: false,
            resolved_at,
        }
    }

    /// Final winners keyed by prospect id
    pub fn winners(&self) -> &BTreeMap<String, WinningEntry> {
        &self.winners
    }

    /// Teams whose roster and ledger changes have been durably applied
    pub fn applied_teams(&self) -> &BTreeSet<String> {
        &self.applied_teams
    }

    /// Mark one team's apply as durable
    pub fn mark_applied(&mut self, team: &str) {
        self.applied_teams.insert(team.to_string());
    }

    /// Whether every team has been applied and the week is closed out
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Close out the resolution; no further applies will run
    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    /// UTC instant the allocation was computed
    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }
}

/// Persisted state for one auction week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionWeek {
    /// Monday of this week in league-local time (the record's key)
    week_start: NaiveDate,

    /// Cached phase as of the last write; advisory only, always
    /// recomputed from the clock on read
    phase: Phase,

    /// Participants ordered worst standing first; tie-breaks only
    priority_order: Vec<String>,

    /// All accepted bids, in submission order
    bids: Vec<Bid>,

    /// All recorded match / forfeit decisions
    decisions: Vec<MatchDecision>,

    /// Season boundaries in effect when this week's record was created
    schedule_snapshot: SeasonSchedule,

    /// Present once Sunday processing has computed winners
    resolution: Option<WeekResolution>,

    /// UTC instant of the last mutation
    last_updated: DateTime<Utc>,
}

impl AuctionWeek {
    /// Create an empty record for a week
    pub fn new(
        week_start: NaiveDate,
        phase: Phase,
        priority_order: Vec<String>,
        schedule_snapshot: SeasonSchedule,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            week_start,
            phase,
            priority_order,
            bids: Vec::new(),
            decisions: Vec::new(),
            schedule_snapshot,
            resolution: None,
            last_updated: created_at,
        }
    }

    /// Monday of this week (the record's key)
    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    /// Cached phase from the last write (advisory)
    pub fn cached_phase(&self) -> Phase {
        self.phase
    }

    /// Refresh the cached phase
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Weekly priority order, worst standing first
    pub fn priority_order(&self) -> &[String] {
        &self.priority_order
    }

    /// Priority order as team -> index, for tie-breaking
    ///
    /// Teams missing from the order rank behind every listed team.
    pub fn priority_index(&self) -> HashMap<String, usize> {
        self.priority_order
            .iter()
            .enumerate()
            .map(|(idx, team)| (team.clone(), idx))
            .collect()
    }

    /// All accepted bids in submission order
    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    /// All recorded decisions
    pub fn decisions(&self) -> &[MatchDecision] {
        &self.decisions
    }

    /// Season boundaries captured when the record was created
    pub fn schedule_snapshot(&self) -> &SeasonSchedule {
        &self.schedule_snapshot
    }

    /// Resolution outcome, if Sunday processing has run
    pub fn resolution(&self) -> Option<&WeekResolution> {
        self.resolution.as_ref()
    }

    /// Mutable resolution outcome
    pub fn resolution_mut(&mut self) -> Option<&mut WeekResolution> {
        self.resolution.as_mut()
    }

    /// Install the computed allocation (at most once per week)
    pub fn set_resolution(&mut self, resolution: WeekResolution) {
        debug_assert!(self.resolution.is_none(), "resolution set twice for one week");
        self.resolution = Some(resolution);
    }

    /// UTC instant of the last mutation
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Stamp a mutation time
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_updated = at;
    }

    /// Append an accepted bid
    pub fn push_bid(&mut self, bid: Bid) {
        self.bids.push(bid);
    }

    /// Append a recorded decision
    pub fn push_decision(&mut self, decision: MatchDecision) {
        self.decisions.push(decision);
    }

    // =========================================================================
    // Derived-bid queries
    // =========================================================================

    /// The prospect's originating bid, if one exists this week
    pub fn originating_bid(&self, prospect_id: &str) -> Option<&Bid> {
        self.bids
            .iter()
            .find(|b| b.is_originating() && b.prospect_id() == prospect_id)
    }

    /// Whether the team has already placed its one originating bid
    pub fn has_originating_bid_by(&self, team: &str) -> bool {
        self.bids.iter().any(|b| b.is_originating() && b.team() == team)
    }

    /// Highest bid amount on the prospect across both bid kinds
    ///
    /// Zero when the prospect has no bids at all.
    pub fn current_high(&self, prospect_id: &str) -> i64 {
        self.bids
            .iter()
            .filter(|b| b.prospect_id() == prospect_id)
            .map(Bid::amount)
            .max()
            .unwrap_or(0)
    }

    /// The bid currently holding the prospect's high amount
    ///
    /// When several bids are tied at the high amount, the earliest
    /// submission holds it: a later bid only takes over by strictly
    /// exceeding the current holder.
    pub fn high_bid(&self, prospect_id: &str) -> Option<&Bid> {
        let mut holder: Option<&Bid> = None;
        for bid in self.bids.iter().filter(|b| b.prospect_id() == prospect_id) {
            match holder {
                Some(current) if bid.amount() <= current.amount() => {}
                _ => holder = Some(bid),
            }
        }
        holder
    }

    /// Sum of high-bid amounts the team currently holds across prospects
    ///
    /// This is the "committed" figure used by the advisory affordability
    /// check at placement time.
    pub fn committed_total(&self, team: &str) -> i64 {
        let prospect_ids: BTreeSet<&str> = self.bids.iter().map(Bid::prospect_id).collect();
        prospect_ids
            .into_iter()
            .filter_map(|pid| self.high_bid(pid))
            .filter(|b| b.team() == team)
            .map(Bid::amount)
            .sum()
    }

    /// Whether the team already challenged this prospect on this local date
    pub fn has_challenge_on(&self, team: &str, prospect_id: &str, date: NaiveDate) -> bool {
        self.bids.iter().any(|b| {
            b.kind() == BidKind::Challenge
                && b.team() == team
                && b.prospect_id() == prospect_id
                && b.local_date() == date
        })
    }

    /// The team's recorded decision on a prospect, if any
    pub fn decision_for(&self, team: &str, prospect_id: &str) -> Option<Decision> {
        self.decisions
            .iter()
            .find(|d| d.team() == team && d.prospect_id() == prospect_id)
            .map(MatchDecision::decision)
    }
}
