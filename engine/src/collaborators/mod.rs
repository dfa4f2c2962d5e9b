//! External collaborator contracts
//!
//! The auction engine is a client of three stores it does not own: the
//! roster/catalog (which prospects exist and who owns them), the ledger
//! (spendable funds per team), and the standings source (weekly priority
//! order). Other subsystems (drafts, trades) share the same stores, so the
//! engine treats them as already internally consistent and talks to them
//! only through these traits.
//!
//! All methods take `&self`; implementations own whatever interior locking
//! their backing storage needs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory;

pub use memory::{DebitRecord, MemoryLedger, MemoryRoster, MemoryStandings};

/// Failure inside an external store
///
/// These are unexpected faults (spec-level "collaborator fault"), never
/// validation outcomes: a missing prospect or unknown team is reported by
/// the lookup methods returning `None`/`false`, not by this error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("roster store failure: {0}")]
    Roster(String),

    #[error("ledger store failure: {0}")]
    Ledger(String),
}

/// A prospect as seen through the roster store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterItem {
    /// Catalog identifier
    pub id: String,

    /// Current owning team, if any
    pub owner: Option<String>,
}

impl RosterItem {
    /// True when no team currently owns the prospect
    pub fn is_unowned(&self) -> bool {
        self.owner.is_none()
    }
}

/// Read/write contract with the roster/catalog store
pub trait RosterStore: Send + Sync {
    /// Whether the team identifier names a league participant
    fn is_known_team(&self, team: &str) -> bool;

    /// All league participants (used for the standings fallback)
    fn known_teams(&self) -> Vec<String>;

    /// Look up a prospect by catalog id
    fn find_item(&self, prospect_id: &str) -> Option<RosterItem>;

    /// Assign ownership of a prospect to a team
    ///
    /// If the prospect carries no acquisition-type tag yet, the store
    /// records `default_tag_if_unset`; an existing tag is left alone.
    /// Re-assigning a prospect to its current owner must be a no-op so
    /// that a retried resolution apply is safe.
    fn assign_owner(
        &self,
        prospect_id: &str,
        team: &str,
        default_tag_if_unset: &str,
    ) -> Result<(), CollaboratorError>;
}

/// Read/write contract with the balance ledger
pub trait LedgerStore: Send + Sync {
    /// The team's spendable balance (whole currency units)
    fn balance(&self, team: &str) -> i64;

    /// Debit the team's balance
    ///
    /// The resolver issues exactly one debit per team per resolution,
    /// covering that team's full weekly spend.
    fn debit(&self, team: &str, amount: i64, reason: &str) -> Result<(), CollaboratorError>;
}

/// Read contract with the standings source
pub trait StandingsSource: Send + Sync {
    /// Participants ordered worst record first, or `None` if standings
    /// are unavailable (the engine then falls back to an alphabetical
    /// list of known teams)
    fn priority_order(&self) -> Option<Vec<String>>;
}

// Shared references delegate, so an engine can borrow stores that the
// caller keeps inspecting (tests, or a process hosting several engines).

impl<'a, T: RosterStore + ?Sized> RosterStore for &'a T {
    fn is_known_team(&self, team: &str) -> bool {
        (**self).is_known_team(team)
    }

    fn known_teams(&self) -> Vec<String> {
        (**self).known_teams()
    }

    fn find_item(&self, prospect_id: &str) -> Option<RosterItem> {
        (**self).find_item(prospect_id)
    }

    fn assign_owner(
        &self,
        prospect_id: &str,
        team: &str,
        default_tag_if_unset: &str,
    ) -> Result<(), CollaboratorError> {
        (**self).assign_owner(prospect_id, team, default_tag_if_unset)
    }
}

impl<'a, T: LedgerStore + ?Sized> LedgerStore for &'a T {
    fn balance(&self, team: &str) -> i64 {
        (**self).balance(team)
    }

    fn debit(&self, team: &str, amount: i64, reason: &str) -> Result<(), CollaboratorError> {
        (**self).debit(team, amount, reason)
    }
}

impl<'a, T: StandingsSource + ?Sized> StandingsSource for &'a T {
    fn priority_order(&self) -> Option<Vec<String>> {
        (**self).priority_order()
    }
}
