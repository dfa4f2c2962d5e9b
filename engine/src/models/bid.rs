//! Bid model
//!
//! A bid is an immutable, append-only record: once accepted into a week it
//! is never edited or deleted, including after resolution. Each bid carries
//! both the UTC instant it was submitted and the league-local calendar date,
//! which drives the one-challenge-per-day rule.
//!
//! CRITICAL: All currency values are i64 whole units.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Kind of bid
///
/// An originating bid opens a prospect's auction for the week; challenge
/// bids compete against an existing originating bid. Serialized with the
/// league's traditional `"OB"` / `"CB"` tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidKind {
    /// Originating bid: the first, prospect-opening bid of the week
    #[serde(rename = "OB")]
    Originating,

    /// Challenge bid: a competing bid against an existing originating bid
    #[serde(rename = "CB")]
    Challenge,
}

/// A single accepted bid
///
/// # Example
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use prospect_auction_core_rs::{Bid, BidKind};
///
/// let eastern = FixedOffset::west_opt(4 * 3600).unwrap();
/// let now = eastern.with_ymd_and_hms(2026, 4, 6, 16, 30, 0).unwrap();
///
/// let bid = Bid::new("WIZ".to_string(), "p1001".to_string(), 15, BidKind::Originating, now);
/// assert_eq!(bid.amount(), 15);
/// assert_eq!(bid.local_date().to_string(), "2026-04-06");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Unique bid identifier (UUID)
    id: String,

    /// Bidding team's identifier
    team: String,

    /// Prospect the bid is for
    prospect_id: String,

    /// Bid amount in whole currency units (always positive)
    amount: i64,

    /// Originating or challenge
    kind: BidKind,

    /// UTC instant the bid was accepted
    submitted_at: DateTime<Utc>,

    /// League-local calendar date of submission (per-day challenge dedup)
    local_date: NaiveDate,
}

impl Bid {
    /// Create a bid stamped from a league-local timestamp
    ///
    /// The UTC instant and the local calendar date are both derived from
    /// `now`, so the pair can never disagree about which day the bid
    /// belongs to.
    ///
    /// # Panics
    /// Panics if `amount` is not positive; the validator rejects
    /// non-positive amounts before construction.
    pub fn new(
        team: String,
        prospect_id: String,
        amount: i64,
        kind: BidKind,
        now: DateTime<FixedOffset>,
    ) -> Self {
        assert!(amount > 0, "amount must be positive");
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            team,
            prospect_id,
            amount,
            kind,
            submitted_at: now.with_timezone(&Utc),
            local_date: now.date_naive(),
        }
    }

    /// Unique bid id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Bidding team
    pub fn team(&self) -> &str {
        &self.team
    }

    /// Prospect this bid targets
    pub fn prospect_id(&self) -> &str {
        &self.prospect_id
    }

    /// Bid amount (whole currency units)
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Originating or challenge
    pub fn kind(&self) -> BidKind {
        self.kind
    }

    /// UTC instant the bid was accepted
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// League-local calendar date of submission
    pub fn local_date(&self) -> NaiveDate {
        self.local_date
    }

    /// True for originating bids
    pub fn is_originating(&self) -> bool {
        self.kind == BidKind::Originating
    }

    /// True for challenge bids
    pub fn is_challenge(&self) -> bool {
        self.kind == BidKind::Challenge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    #[should_panic(expected = "amount must be positive")]
    fn test_zero_amount_panics() {
        let now = FixedOffset::west_opt(4 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 4, 6, 16, 0, 0)
            .unwrap();
        Bid::new("WIZ".to_string(), "p1".to_string(), 0, BidKind::Originating, now);
    }

    #[test]
    fn test_local_date_crosses_utc_midnight() {
        // 22:00 Eastern on the 6th is already the 7th in UTC; the bid's
        // local date must stay on the 6th.
        let now = FixedOffset::west_opt(4 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 4, 6, 22, 0, 0)
            .unwrap();
        let bid = Bid::new("WIZ".to_string(), "p1".to_string(), 10, BidKind::Originating, now);
        assert_eq!(bid.local_date(), NaiveDate::from_ymd_opt(2026, 4, 6).unwrap());
        assert_eq!(bid.submitted_at().date_naive(), NaiveDate::from_ymd_opt(2026, 4, 7).unwrap());
    }
}
