//! Match / forfeit decisions
//!
//! During the Saturday window the originating manager of each challenged
//! prospect chooses to match the leading challenge price or forfeit the
//! prospect. Decisions are final: at most one exists per (team, prospect)
//! and none is ever revised or retracted.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// The originating manager's choice on a challenged prospect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Meet the leading challenge price and keep the prospect
    Match,

    /// Concede the prospect to the leading challenger
    Forfeit,
}

/// Error parsing a textual decision
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Decision must be 'match' or 'forfeit'.")]
pub struct ParseDecisionError;

impl FromStr for Decision {
    type Err = ParseDecisionError;

    /// Case-insensitive parse for callers that receive free text
    ///
    /// # Example
    /// ```
    /// use prospect_auction_core_rs::Decision;
    ///
    /// assert_eq!("MATCH".parse::<Decision>(), Ok(Decision::Match));
    /// assert_eq!("Forfeit".parse::<Decision>(), Ok(Decision::Forfeit));
    /// assert!("keep".parse::<Decision>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "match" => Ok(Decision::Match),
            "forfeit" => Ok(Decision::Forfeit),
            _ => Err(ParseDecisionError),
        }
    }
}

/// A recorded match / forfeit decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDecision {
    /// Deciding team (always the prospect's originating manager)
    team: String,

    /// Prospect the decision applies to
    prospect_id: String,

    /// Match or forfeit
    decision: Decision,

    /// UTC instant the decision was recorded
    decided_at: DateTime<Utc>,

    /// Free-form origin tag, e.g. "discord" or "web"
    source: String,
}

impl MatchDecision {
    /// Create a decision stamped from a league-local timestamp
    pub fn new(
        team: String,
        prospect_id: String,
        decision: Decision,
        source: String,
        now: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            team,
            prospect_id,
            decision,
            decided_at: now.with_timezone(&Utc),
            source,
        }
    }

    /// Deciding team
    pub fn team(&self) -> &str {
        &self.team
    }

    /// Prospect the decision applies to
    pub fn prospect_id(&self) -> &str {
        &self.prospect_id
    }

    /// Match or forfeit
    pub fn decision(&self) -> Decision {
        self.decision
    }

    /// UTC instant the decision was recorded
    pub fn decided_at(&self) -> DateTime<Utc> {
        self.decided_at
    }

    /// Origin tag supplied by the caller
    pub fn source(&self) -> &str {
        &self.source
    }
}
