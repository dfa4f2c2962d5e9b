//! Shared fixtures for the integration tests
//!
//! One league, four teams, a handful of unowned prospects, and helpers
//! for the league-local timestamps each auction window needs.

#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use prospect_auction_core_rs::collaborators::{MemoryLedger, MemoryRoster, MemoryStandings};
use prospect_auction_core_rs::store::WeekStore;
use prospect_auction_core_rs::{AuctionConfig, AuctionEngine, SeasonSchedule};
use tempfile::TempDir;

pub type TestEngine<'a> = AuctionEngine<&'a MemoryRoster, &'a MemoryLedger, &'a MemoryStandings>;

/// 2026 season: starts April 1, breaks July 13-27, playoffs from Sept 7
pub fn schedule() -> SeasonSchedule {
    SeasonSchedule::new(
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 7, 13).unwrap(),
        NaiveDate::from_ymd_opt(2026, 7, 27).unwrap(),
        NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
    )
}

/// A league-local (US Eastern daylight) timestamp
pub fn et(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    FixedOffset::west_opt(4 * 3600)
        .unwrap()
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
}

// The test week runs Monday 2026-04-06 through Sunday 2026-04-12.

/// Tuesday mid-day: originating window
pub fn ob_time() -> DateTime<FixedOffset> {
    et(2026, 4, 7, 12, 0)
}

/// Thursday mid-day: challenge window
pub fn cb_time() -> DateTime<FixedOffset> {
    et(2026, 4, 9, 12, 0)
}

/// Friday mid-day: challenge window, one local day after `cb_time`
pub fn cb_time_friday() -> DateTime<FixedOffset> {
    et(2026, 4, 10, 12, 0)
}

/// Saturday morning: decision window
pub fn decision_time() -> DateTime<FixedOffset> {
    et(2026, 4, 11, 10, 0)
}

/// Sunday afternoon: processing
pub fn resolve_time() -> DateTime<FixedOffset> {
    et(2026, 4, 12, 14, 0)
}

pub struct Fixture {
    pub roster: MemoryRoster,
    pub ledger: MemoryLedger,
    pub standings: MemoryStandings,
    pub dir: TempDir,
}

impl Fixture {
    /// Teams ANT/BAT/CAT/DOG with $100 each, prospects p1-p4 unowned
    pub fn new() -> Self {
        let roster = MemoryRoster::new();
        let ledger = MemoryLedger::new();
        for team in ["ANT", "BAT", "CAT", "DOG"] {
            roster.add_team(team);
            ledger.set_balance(team, 100);
        }
        for prospect in ["p1", "p2", "p3", "p4"] {
            roster.add_item(prospect);
        }
        Self {
            roster,
            ledger,
            standings: MemoryStandings::unavailable(),
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn engine(&self) -> TestEngine<'_> {
        AuctionEngine::new(
            AuctionConfig::new(schedule()),
            WeekStore::new(self.dir.path()),
            &self.roster,
            &self.ledger,
            &self.standings,
        )
    }
}
