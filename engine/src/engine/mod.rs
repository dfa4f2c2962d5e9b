//! Auction engine operations
//!
//! [`AuctionEngine`] is the single entry point for the write path: bid
//! placement, match/forfeit decisions, and the weekly resolution pass
//! (`resolve_week`, in the sibling `resolve` module). It wires together
//! the schedule resolver, the week store, and the three external
//! collaborators, and owns the rule configuration.
//!
//! # Determinism
//!
//! Every operation takes `now` explicitly as a league-local timestamp.
//! The engine never reads a clock, so identical call sequences produce
//! identical records and every rule is testable offline.
//!
//! # Concurrency
//!
//! All methods take `&self`. Mutating operations run their entire
//! read-validate-append-persist cycle inside the store's per-week lock,
//! so two concurrent submissions for the same week are linearized: the
//! second validates against the record the first already appended to.

mod resolve;

use crate::collaborators::{CollaboratorError, LedgerStore, RosterStore, StandingsSource};
use crate::core::schedule::{phase_for, week_start_for, Phase, SeasonSchedule};
use crate::models::bid::{Bid, BidKind};
use crate::models::decision::{Decision, MatchDecision};
use crate::models::week::AuctionWeek;
use crate::store::{Commit, StoreError, WeekStore};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default minimum amount for an originating bid (whole currency units)
pub const DEFAULT_MIN_ORIGINATING_AMOUNT: i64 = 10;

/// Default minimum raise over the current high bid for a challenge
pub const DEFAULT_MIN_RAISE: i64 = 5;

/// Default acquisition-type tag stamped on prospects won at auction
pub const DEFAULT_ACQUISITION_TAG: &str = "PC";

/// Rule configuration for the auction engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// Season boundaries; snapshotted into each week record on creation
    pub schedule: SeasonSchedule,

    /// Minimum originating bid, and the flat price charged for an
    /// uncontested originating win
    pub min_originating_amount: i64,

    /// Minimum raise a challenge must clear over the current high bid
    pub min_raise: i64,

    /// Acquisition tag applied to won prospects that have none yet
    pub default_acquisition_tag: String,
}

impl AuctionConfig {
    /// Configuration with the league's standard rule amounts
    pub fn new(schedule: SeasonSchedule) -> Self {
        Self {
            schedule,
            min_originating_amount: DEFAULT_MIN_ORIGINATING_AMOUNT,
            min_raise: DEFAULT_MIN_RAISE,
            default_acquisition_tag: DEFAULT_ACQUISITION_TAG.to_string(),
        }
    }
}

/// A rejected operation, with the reason shown to the user verbatim
///
/// Rejections are expected outcomes of the validated write path, never
/// faults: callers surface `Display` text directly to the bidder.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("No auction this week.")]
    OffWeek,

    #[error("Auctions are not active right now.")]
    Inactive,

    #[error("Auction is in processing; bids are closed.")]
    BidsClosed,

    #[error("This week's auction has already been resolved.")]
    WeekResolved,

    #[error("Originating bids are only allowed Monday 3pm through Tuesday.")]
    OriginatingWindowClosed,

    #[error("Challenge bids are only allowed Wednesday through Friday 9pm.")]
    ChallengeWindowClosed,

    #[error("Unknown team: {team}")]
    UnknownTeam { team: String },

    #[error("Bid amount must be positive.")]
    NonPositiveAmount,

    #[error("Prospect not found or not eligible.")]
    UnknownProspect,

    #[error("Prospect already owned and not eligible for auction.")]
    AlreadyOwned,

    #[error("Originating bids must be at least ${min}.")]
    BelowMinimumOriginating { min: i64 },

    #[error("You have already placed an originating bid this week.")]
    DuplicateOriginatingForTeam,

    #[error("This prospect already has an originating bid.")]
    DuplicateOriginatingForProspect,

    #[error("Challenge bids require an existing originating bid.")]
    NoOriginatingBid,

    #[error("The originating manager cannot challenge their own bid.")]
    SelfChallenge,

    #[error("Challenge bids must be at least ${min_raise} above the current high bid (${current_high}).")]
    InsufficientRaise { current_high: i64, min_raise: i64 },

    #[error("You already have a challenge bid on this prospect today.")]
    DailyChallengeLimit,

    #[error("Insufficient funds: ${available} available (balance ${balance}, committed ${committed}).")]
    InsufficientFunds {
        balance: i64,
        committed: i64,
        available: i64,
    },

    #[error("Match / forfeit decisions are only allowed on Saturday.")]
    DecisionWindowClosed,

    #[error("No originating bid found for this prospect.")]
    NothingToDecide,

    #[error("Only the originating manager may record a decision.")]
    NotOriginatingManager,

    #[error("You have already recorded a decision for this prospect.")]
    AlreadyDecided,
}

/// Any failure an engine operation can return
///
/// `Rejected` carries the user-facing outcomes; the remaining variants
/// are operator-facing faults (storage, locking, collaborator failures).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Rejected(#[from] Rejection),

    #[error("state store error: {0}")]
    Store(#[from] StoreError),

    #[error("collaborator fault: {0}")]
    Collaborator(#[from] CollaboratorError),
}

impl EngineError {
    /// The user-facing rejection, if this error is one
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            EngineError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

/// An accepted bid together with the recomputed phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedBid {
    pub bid: Bid,
    pub phase: Phase,
}

/// Core interface for auction operations
///
/// # Example
/// ```
/// use chrono::{FixedOffset, NaiveDate, TimeZone};
/// use prospect_auction_core_rs::collaborators::{MemoryLedger, MemoryRoster, MemoryStandings};
/// use prospect_auction_core_rs::store::WeekStore;
/// use prospect_auction_core_rs::{AuctionConfig, AuctionEngine, BidKind, SeasonSchedule};
///
/// let roster = MemoryRoster::new();
/// roster.add_team("WIZ");
/// roster.add_item("p1001");
/// let ledger = MemoryLedger::new();
/// ledger.set_balance("WIZ", 100);
///
/// let schedule = SeasonSchedule::new(
///     NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 7, 13).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 7, 27).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
/// );
/// let dir = tempfile::tempdir().unwrap();
/// let engine = AuctionEngine::new(
///     AuctionConfig::new(schedule),
///     WeekStore::new(dir.path()),
///     roster,
///     ledger,
///     MemoryStandings::unavailable(),
/// );
///
/// // Tuesday falls inside the originating window.
/// let eastern = FixedOffset::west_opt(4 * 3600).unwrap();
/// let now = eastern.with_ymd_and_hms(2026, 4, 7, 12, 0, 0).unwrap();
/// let placed = engine
///     .place_bid("wiz", "p1001", 15, BidKind::Originating, now)
///     .unwrap();
/// assert_eq!(placed.bid.team(), "WIZ");
/// ```
pub struct AuctionEngine<R, L, S> {
    config: AuctionConfig,
    store: WeekStore,
    roster: R,
    ledger: L,
    standings: S,
}

impl<R, L, S> AuctionEngine<R, L, S>
where
    R: RosterStore,
    L: LedgerStore,
    S: StandingsSource,
{
    /// Wire an engine to its store and collaborators
    pub fn new(config: AuctionConfig, store: WeekStore, roster: R, ledger: L, standings: S) -> Self {
        Self {
            config,
            store,
            roster,
            ledger,
            standings,
        }
    }

    /// Rule configuration in effect
    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    /// The auction phase at `now`
    ///
    /// Touches (and lazily creates) the week's record so the phase is
    /// derived from the schedule snapshot the week was created with.
    pub fn get_current_phase(&self, now: DateTime<FixedOffset>) -> Result<Phase, EngineError> {
        let week_start = week_start_for(now.date_naive());
        let phase = self.store.with_week(
            week_start,
            || self.new_week_record(week_start, now),
            |week| (phase_for(now, week.schedule_snapshot()), Commit::Discard),
        )?;
        Ok(phase)
    }

    /// Validate and place a bid
    ///
    /// Runs the full check sequence (phase gating, kind/phase agreement,
    /// team and prospect eligibility, per-kind uniqueness and raise rules,
    /// advisory affordability) and appends the bid on success. The checks
    /// short-circuit: the first failure is the returned [`Rejection`].
    ///
    /// The affordability check here is advisory only; the hard guarantee
    /// is enforced again during weekly resolution, because balances and
    /// rival bids can change between placement and Sunday.
    pub fn place_bid(
        &self,
        team: &str,
        prospect_id: &str,
        amount: i64,
        kind: BidKind,
        now: DateTime<FixedOffset>,
    ) -> Result<PlacedBid, EngineError> {
        let team = team.to_ascii_uppercase();
        let week_start = week_start_for(now.date_naive());

        let outcome = self.store.with_week(
            week_start,
            || self.new_week_record(week_start, now),
            |week| match self.check_bid(week, &team, prospect_id, amount, kind, now) {
                Ok(bid) => {
                    let phase = phase_for(now, week.schedule_snapshot());
                    week.push_bid(bid.clone());
                    week.set_phase(phase);
                    week.touch(now.with_timezone(&Utc));
                    (Ok(PlacedBid { bid, phase }), Commit::Persist)
                }
                Err(rejection) => (Err(rejection), Commit::Discard),
            },
        )?;

        match outcome {
            Ok(placed) => {
                tracing::info!(
                    team = %placed.bid.team(),
                    prospect = %placed.bid.prospect_id(),
                    amount = placed.bid.amount(),
                    kind = ?placed.bid.kind(),
                    "bid accepted"
                );
                Ok(placed)
            }
            Err(rejection) => {
                tracing::debug!(team = %team, prospect = %prospect_id, %rejection, "bid rejected");
                Err(rejection.into())
            }
        }
    }

    /// Record the originating manager's match / forfeit decision
    ///
    /// Only valid during the Saturday window, only from the prospect's
    /// originating manager, and only once: decisions are final.
    pub fn record_decision(
        &self,
        team: &str,
        prospect_id: &str,
        decision: Decision,
        source: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<MatchDecision, EngineError> {
        let team = team.to_ascii_uppercase();
        let week_start = week_start_for(now.date_naive());

        let outcome = self.store.with_week(
            week_start,
            || self.new_week_record(week_start, now),
            |week| {
                match Self::check_decision(week, &team, prospect_id, now) {
                    Ok(()) => {}
                    Err(rejection) => return (Err(rejection), Commit::Discard),
                }
                let record = MatchDecision::new(
                    team.clone(),
                    prospect_id.to_string(),
                    decision,
                    source.to_string(),
                    now,
                );
                week.push_decision(record.clone());
                week.set_phase(phase_for(now, week.schedule_snapshot()));
                week.touch(now.with_timezone(&Utc));
                (Ok(record), Commit::Persist)
            },
        )?;

        match outcome {
            Ok(record) => {
                tracing::info!(
                    team = %record.team(),
                    prospect = %record.prospect_id(),
                    decision = ?record.decision(),
                    "decision recorded"
                );
                Ok(record)
            }
            Err(rejection) => {
                tracing::debug!(team = %team, prospect = %prospect_id, %rejection, "decision rejected");
                Err(rejection.into())
            }
        }
    }

    /// Full bid validation sequence; returns the bid to append
    fn check_bid(
        &self,
        week: &AuctionWeek,
        team: &str,
        prospect_id: &str,
        amount: i64,
        kind: BidKind,
        now: DateTime<FixedOffset>,
    ) -> Result<Bid, Rejection> {
        // 1. The week and the moment must both be bid-eligible.
        let snapshot = week.schedule_snapshot();
        if !snapshot.is_auction_week(now.date_naive()) {
            return Err(Rejection::OffWeek);
        }
        let phase = phase_for(now, snapshot);
        if phase == Phase::OffWeek {
            return Err(Rejection::Inactive);
        }
        if phase == Phase::Processing {
            return Err(Rejection::BidsClosed);
        }
        if week.resolution().is_some_and(|r| r.is_completed()) {
            return Err(Rejection::WeekResolved);
        }

        // 2. The bid kind must match the window exactly.
        match kind {
            BidKind::Originating if phase != Phase::OriginatingWindow => {
                return Err(Rejection::OriginatingWindowClosed);
            }
            BidKind::Challenge if phase != Phase::ChallengeWindow => {
                return Err(Rejection::ChallengeWindowClosed);
            }
            _ => {}
        }

        // 3. Participant and amount sanity.
        if !self.roster.is_known_team(team) {
            return Err(Rejection::UnknownTeam {
                team: team.to_string(),
            });
        }
        if amount <= 0 {
            return Err(Rejection::NonPositiveAmount);
        }

        // 4. The prospect must exist and be unowned.
        let item = self
            .roster
            .find_item(prospect_id)
            .ok_or(Rejection::UnknownProspect)?;
        if !item.is_unowned() {
            return Err(Rejection::AlreadyOwned);
        }

        // 5/6. Kind-specific rules.
        match kind {
            BidKind::Originating => {
                if amount < self.config.min_originating_amount {
                    return Err(Rejection::BelowMinimumOriginating {
                        min: self.config.min_originating_amount,
                    });
                }
                if week.has_originating_bid_by(team) {
                    return Err(Rejection::DuplicateOriginatingForTeam);
                }
                if week.originating_bid(&item.id).is_some() {
                    return Err(Rejection::DuplicateOriginatingForProspect);
                }
            }
            BidKind::Challenge => {
                let ob = week
                    .originating_bid(&item.id)
                    .ok_or(Rejection::NoOriginatingBid)?;
                if ob.team() == team {
                    return Err(Rejection::SelfChallenge);
                }
                let current_high = week.current_high(&item.id);
                if amount < current_high + self.config.min_raise {
                    return Err(Rejection::InsufficientRaise {
                        current_high,
                        min_raise: self.config.min_raise,
                    });
                }
                if week.has_challenge_on(team, &item.id, now.date_naive()) {
                    return Err(Rejection::DailyChallengeLimit);
                }
            }
        }

        // 7. Advisory affordability against currently-held high bids.
        let balance = self.ledger.balance(team);
        let committed = week.committed_total(team);
        if committed + amount > balance {
            return Err(Rejection::InsufficientFunds {
                balance,
                committed,
                available: balance - committed,
            });
        }

        Ok(Bid::new(team.to_string(), item.id, amount, kind, now))
    }

    /// Decision validation sequence
    fn check_decision(
        week: &AuctionWeek,
        team: &str,
        prospect_id: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<(), Rejection> {
        let snapshot = week.schedule_snapshot();
        if !snapshot.is_auction_week(now.date_naive()) {
            return Err(Rejection::OffWeek);
        }
        if phase_for(now, snapshot) != Phase::OriginatingFinal {
            return Err(Rejection::DecisionWindowClosed);
        }
        if week.resolution().is_some_and(|r| r.is_completed()) {
            return Err(Rejection::WeekResolved);
        }

        let ob = week
            .originating_bid(prospect_id)
            .ok_or(Rejection::NothingToDecide)?;
        if ob.team() != team {
            return Err(Rejection::NotOriginatingManager);
        }
        if week.decision_for(team, prospect_id).is_some() {
            return Err(Rejection::AlreadyDecided);
        }
        Ok(())
    }

    /// Build a fresh record for a week being touched for the first time
    fn new_week_record(&self, week_start: NaiveDate, now: DateTime<FixedOffset>) -> AuctionWeek {
        AuctionWeek::new(
            week_start,
            phase_for(now, &self.config.schedule),
            self.weekly_priority_order(),
            self.config.schedule.clone(),
            now.with_timezone(&Utc),
        )
    }

    /// Standings-derived priority order, worst record first
    ///
    /// Falls back to an alphabetical list of known teams when the
    /// standings source is unavailable or empty.
    fn weekly_priority_order(&self) -> Vec<String> {
        match self.standings.priority_order() {
            Some(order) if !order.is_empty() => order,
            _ => {
                let mut teams = self.roster.known_teams();
                teams.sort();
                teams
            }
        }
    }
}
