//! Weekly auction schedule
//!
//! The auction runs on a fixed wall-clock cadence within each active week:
//! originating bids Monday afternoon through Tuesday, challenge bids
//! Wednesday through Friday evening, match/forfeit decisions on Saturday,
//! and resolution on Sunday. Season boundaries (season start, mid-season
//! break, playoff cutoff) switch entire weeks off.
//!
//! Everything in this module is a pure function of the supplied timestamp
//! and schedule. Callers pass `now` explicitly; nothing here reads a clock.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// High-level phase of the weekly auction
///
/// `OffWeek` means auctions are not open at this moment, either because the
/// whole week is inactive (pre-season, mid-season break, playoffs) or
/// because `now` falls in a gap between bidding windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    OffWeek,
    OriginatingWindow,
    ChallengeWindow,
    OriginatingFinal,
    Processing,
}

impl Phase {
    /// True for the phases in which new bids may be accepted
    ///
    /// # Example
    /// ```
    /// use prospect_auction_core_rs::Phase;
    ///
    /// assert!(Phase::OriginatingWindow.accepts_bids());
    /// assert!(!Phase::Processing.accepts_bids());
    /// ```
    pub fn accepts_bids(&self) -> bool {
        matches!(self, Phase::OriginatingWindow | Phase::ChallengeWindow)
    }
}

/// Season boundary dates, all in league-local calendar days
///
/// A week is auction-active only when its days fall on or after
/// `season_start`, outside the `[break_start, break_end)` window, and
/// strictly before `playoff_cutoff`.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use prospect_auction_core_rs::SeasonSchedule;
///
/// let schedule = SeasonSchedule::new(
///     NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 7, 13).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 7, 27).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
/// );
///
/// assert!(schedule.is_auction_week(NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()));
/// assert!(!schedule.is_auction_week(NaiveDate::from_ymd_opt(2026, 7, 20).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSchedule {
    /// First auction-eligible date (Monday of the first auction week)
    pub season_start: NaiveDate,

    /// Monday of the mid-season break (auctions off from here)
    pub break_start: NaiveDate,

    /// Monday auctions resume after the break
    pub break_end: NaiveDate,

    /// Monday of the playoff week; auctions stay off from here on
    pub playoff_cutoff: NaiveDate,
}

impl SeasonSchedule {
    /// Create a schedule from its four boundary dates
    ///
    /// # Panics
    /// Panics if the dates are not in chronological order.
    pub fn new(
        season_start: NaiveDate,
        break_start: NaiveDate,
        break_end: NaiveDate,
        playoff_cutoff: NaiveDate,
    ) -> Self {
        assert!(season_start <= break_start, "break must not precede season start");
        assert!(break_start <= break_end, "break must end after it starts");
        assert!(break_end <= playoff_cutoff, "playoffs must follow the break");
        Self {
            season_start,
            break_start,
            break_end,
            playoff_cutoff,
        }
    }

    /// Whether auctions run at all on the given league-local date
    pub fn is_auction_week(&self, date: NaiveDate) -> bool {
        if date < self.season_start {
            return false;
        }
        if self.break_start <= date && date < self.break_end {
            return false;
        }
        if date >= self.playoff_cutoff {
            return false;
        }
        true
    }
}

/// Monday of the week containing the given league-local date
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use prospect_auction_core_rs::core::schedule::week_start_for;
///
/// // Thursday 2026-04-09 belongs to the week starting Monday 2026-04-06.
/// let thursday = NaiveDate::from_ymd_opt(2026, 4, 9).unwrap();
/// assert_eq!(week_start_for(thursday), NaiveDate::from_ymd_opt(2026, 4, 6).unwrap());
/// ```
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Derive the auction phase for a league-local timestamp
///
/// Pure and total: any timestamp maps to exactly one phase, and identical
/// inputs always produce identical output. The windows are:
///
/// - Monday 15:00 through Tuesday end-of-day: [`Phase::OriginatingWindow`]
/// - Wednesday 00:00 through Friday 21:00: [`Phase::ChallengeWindow`]
/// - Saturday 00:00 through 22:00: [`Phase::OriginatingFinal`]
/// - Sunday, any time: [`Phase::Processing`]
/// - anything else (inactive week, Monday morning, late Friday/Saturday):
///   [`Phase::OffWeek`]
///
/// # Example
/// ```
/// use chrono::{FixedOffset, NaiveDate, TimeZone};
/// use prospect_auction_core_rs::core::schedule::phase_for;
/// use prospect_auction_core_rs::{Phase, SeasonSchedule};
///
/// let schedule = SeasonSchedule::new(
///     NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 7, 13).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 7, 27).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
/// );
///
/// // League runs on US Eastern daylight time (UTC-4).
/// let eastern = FixedOffset::west_opt(4 * 3600).unwrap();
///
/// // Monday 2026-04-06 at 16:00 is inside the originating window.
/// let now = eastern.with_ymd_and_hms(2026, 4, 6, 16, 0, 0).unwrap();
/// assert_eq!(phase_for(now, &schedule), Phase::OriginatingWindow);
///
/// // Monday morning is a gap between windows.
/// let now = eastern.with_ymd_and_hms(2026, 4, 6, 9, 0, 0).unwrap();
/// assert_eq!(phase_for(now, &schedule), Phase::OffWeek);
/// ```
pub fn phase_for(now: DateTime<FixedOffset>, schedule: &SeasonSchedule) -> Phase {
    if !schedule.is_auction_week(now.date_naive()) {
        return Phase::OffWeek;
    }

    let weekday = now.weekday();
    let t = now.time();

    let at = |h: u32, m: u32| -> NaiveTime {
        // Hour/minute literals below are all in range.
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    };

    match weekday {
        // Originating bids: Monday 3pm through Tuesday end-of-day
        Weekday::Mon if t >= at(15, 0) => Phase::OriginatingWindow,
        Weekday::Tue => Phase::OriginatingWindow,

        // Challenge bids: Wednesday 12am through Friday 9pm
        Weekday::Wed | Weekday::Thu => Phase::ChallengeWindow,
        Weekday::Fri if t <= at(21, 0) => Phase::ChallengeWindow,

        // Match / forfeit decisions: Saturday 12am through 10pm
        Weekday::Sat if t <= at(22, 0) => Phase::OriginatingFinal,

        // Sunday is resolution day
        Weekday::Sun => Phase::Processing,

        _ => Phase::OffWeek,
    }
}
