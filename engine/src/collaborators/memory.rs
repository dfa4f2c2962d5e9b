//! In-memory collaborator implementations
//!
//! Reference implementations of the collaborator traits backed by plain
//! maps behind a mutex. They stand in for the league's real stores in
//! examples and tests; `MemoryLedger` additionally records every debit and
//! can be told to fail debits for one team, which is how the partial-apply
//! recovery path is exercised.

use super::{CollaboratorError, RosterItem, RosterStore};
use super::{LedgerStore, StandingsSource};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct RosterInner {
    teams: BTreeSet<String>,
    items: BTreeMap<String, StoredItem>,
}

#[derive(Debug, Clone, Default)]
struct StoredItem {
    owner: Option<String>,
    acquisition_tag: Option<String>,
}

/// Map-backed [`RosterStore`]
///
/// # Example
/// ```
/// use prospect_auction_core_rs::collaborators::{MemoryRoster, RosterStore};
///
/// let roster = MemoryRoster::new();
/// roster.add_team("WIZ");
/// roster.add_item("p1001");
///
/// assert!(roster.is_known_team("WIZ"));
/// assert!(roster.find_item("p1001").unwrap().is_unowned());
///
/// roster.assign_owner("p1001", "WIZ", "PC").unwrap();
/// assert_eq!(roster.find_item("p1001").unwrap().owner.as_deref(), Some("WIZ"));
/// assert_eq!(roster.acquisition_tag("p1001").as_deref(), Some("PC"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryRoster {
    inner: Mutex<RosterInner>,
}

impl MemoryRoster {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a league participant
    pub fn add_team(&self, team: &str) {
        self.inner.lock().unwrap().teams.insert(team.to_string());
    }

    /// Register an unowned prospect
    pub fn add_item(&self, prospect_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .items
            .insert(prospect_id.to_string(), StoredItem::default());
    }

    /// Register a prospect that already has an owner
    pub fn add_owned_item(&self, prospect_id: &str, owner: &str) {
        self.inner.lock().unwrap().items.insert(
            prospect_id.to_string(),
            StoredItem {
                owner: Some(owner.to_string()),
                acquisition_tag: None,
            },
        );
    }

    /// The prospect's acquisition-type tag, if one has been set
    pub fn acquisition_tag(&self, prospect_id: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .items
            .get(prospect_id)
            .and_then(|item| item.acquisition_tag.clone())
    }
}

impl RosterStore for MemoryRoster {
    fn is_known_team(&self, team: &str) -> bool {
        self.inner.lock().unwrap().teams.contains(team)
    }

    fn known_teams(&self) -> Vec<String> {
        self.inner.lock().unwrap().teams.iter().cloned().collect()
    }

    fn find_item(&self, prospect_id: &str) -> Option<RosterItem> {
        self.inner
            .lock()
            .unwrap()
            .items
            .get(prospect_id)
            .map(|item| RosterItem {
                id: prospect_id.to_string(),
                owner: item.owner.clone(),
            })
    }

    fn assign_owner(
        &self,
        prospect_id: &str,
        team: &str,
        default_tag_if_unset: &str,
    ) -> Result<(), CollaboratorError> {
        let mut inner = self.inner.lock().unwrap();
        let item = inner
            .items
            .get_mut(prospect_id)
            .ok_or_else(|| CollaboratorError::Roster(format!("unknown prospect {prospect_id}")))?;
        item.owner = Some(team.to_string());
        if item.acquisition_tag.is_none() {
            item.acquisition_tag = Some(default_tag_if_unset.to_string());
        }
        Ok(())
    }
}

/// One debit as recorded by [`MemoryLedger`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebitRecord {
    pub team: String,
    pub amount: i64,
    pub reason: String,
}

#[derive(Debug, Default)]
struct LedgerInner {
    balances: BTreeMap<String, i64>,
    debits: Vec<DebitRecord>,
    fail_team: Option<String>,
}

/// Map-backed [`LedgerStore`] with a recorded debit log
#[derive(Debug, Default)]
pub struct MemoryLedger {
    inner: Mutex<LedgerInner>,
}

impl MemoryLedger {
    /// Create an empty ledger (all balances zero)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a team's balance
    pub fn set_balance(&self, team: &str, balance: i64) {
        self.inner
            .lock()
            .unwrap()
            .balances
            .insert(team.to_string(), balance);
    }

    /// Every debit issued so far, in order
    pub fn debits(&self) -> Vec<DebitRecord> {
        self.inner.lock().unwrap().debits.clone()
    }

    /// Make subsequent debits for one team fail (fault injection)
    pub fn fail_debits_for(&self, team: Option<&str>) {
        self.inner.lock().unwrap().fail_team = team.map(str::to_string);
    }
}

impl LedgerStore for MemoryLedger {
    fn balance(&self, team: &str) -> i64 {
        self.inner
            .lock()
            .unwrap()
            .balances
            .get(team)
            .copied()
            .unwrap_or(0)
    }

    fn debit(&self, team: &str, amount: i64, reason: &str) -> Result<(), CollaboratorError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_team.as_deref() == Some(team) {
            return Err(CollaboratorError::Ledger(format!(
                "injected debit failure for {team}"
            )));
        }
        *inner.balances.entry(team.to_string()).or_insert(0) -= amount;
        inner.debits.push(DebitRecord {
            team: team.to_string(),
            amount,
            reason: reason.to_string(),
        });
        Ok(())
    }
}

/// Fixed-order [`StandingsSource`]
#[derive(Debug, Default)]
pub struct MemoryStandings {
    order: Mutex<Option<Vec<String>>>,
}

impl MemoryStandings {
    /// A source with no standings available (alphabetical fallback)
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// A source returning the given order, worst record first
    pub fn with_order(order: Vec<String>) -> Self {
        Self {
            order: Mutex::new(Some(order)),
        }
    }

    /// Replace the order mid-test
    pub fn set_order(&self, order: Option<Vec<String>>) {
        *self.order.lock().unwrap() = order;
    }
}

impl StandingsSource for MemoryStandings {
    fn priority_order(&self) -> Option<Vec<String>> {
        self.order.lock().unwrap().clone()
    }
}
