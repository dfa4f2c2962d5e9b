//! Weekly resolution (Sunday processing)
//!
//! Orchestrates the three resolution phases over one week record, under
//! that week's lock:
//!
//! - **Phase A/B** (pure, in [`crate::resolution`]): tentative winners,
//!   then the affordability fixed point, evaluated against a one-shot
//!   snapshot of ledger balances.
//! - **Phase C** (here): apply the final allocation to the roster and
//!   ledger collaborators, one team at a time, checkpointing the record
//!   after each team so a fault mid-apply is resumable without
//!   re-debiting anyone.
//!
//! Re-invoking `resolve_week` on a completed week returns the stored
//! summary and touches nothing.

use crate::collaborators::{LedgerStore, RosterStore, StandingsSource};
use crate::core::schedule::{week_start_for, Phase};
use crate::models::week::{AuctionWeek, WeekResolution, WinningEntry};
use crate::resolution::{compute_tentative_winners, enforce_affordability, ResolutionSummary};
use crate::store::Commit;
use super::{AuctionEngine, EngineError};
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};

impl<R, L, S> AuctionEngine<R, L, S>
where
    R: RosterStore,
    L: LedgerStore,
    S: StandingsSource,
{
    /// Resolve the current week's auction and apply the results
    ///
    /// Intended to run once, at or after the week enters
    /// [`Phase::Processing`] on Sunday, from a scheduled job. Safe to
    /// invoke again: a completed week returns its stored summary with no
    /// further roster or ledger writes, and a run interrupted by a
    /// collaborator fault resumes from the last applied team.
    pub fn resolve_week(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<ResolutionSummary, EngineError> {
        let week_start = week_start_for(now.date_naive());
        let outcome = self.store.with_week(
            week_start,
            || self.new_week_record(week_start, now),
            |week| self.resolve_locked(week, now),
        )?;

        if let Ok(ResolutionSummary::Resolved { winners, .. }) = &outcome {
            tracing::info!(
                week_start = %week_start,
                prospects_sold = winners.len(),
                "weekly auction resolved"
            );
        }
        outcome
    }

    /// The full resolution pass, run while holding the week's lock
    fn resolve_locked(
        &self,
        week: &mut AuctionWeek,
        now: DateTime<FixedOffset>,
    ) -> (Result<ResolutionSummary, EngineError>, Commit) {
        if !week.schedule_snapshot().is_auction_week(now.date_naive()) {
            return (Ok(ResolutionSummary::Inactive), Commit::Discard);
        }

        if let Some(resolution) = week.resolution() {
            if resolution.is_completed() {
                return (
                    Ok(ResolutionSummary::Resolved {
                        week_start: week.week_start(),
                        winners: resolution.winners().clone(),
                    }),
                    Commit::Discard,
                );
            }
        }

        if week.bids().is_empty() {
            return (Ok(ResolutionSummary::NoBids), Commit::Discard);
        }

        // Phase A + B: compute the allocation once and persist it before
        // touching any collaborator, so a retry replays the same winners.
        if week.resolution().is_none() {
            let winners = self.compute_allocation(week);
            week.set_resolution(WeekResolution::new(winners, now.with_timezone(&Utc)));
            week.touch(now.with_timezone(&Utc));
            if let Err(e) = self.store.persist(week) {
                return (Err(e.into()), Commit::Discard);
            }
        }

        // Phase C: apply per team, in sorted order, skipping teams whose
        // apply already went durable on an earlier attempt.
        // Resolution is installed above; the lock is still held.
        let winners = week.resolution().unwrap().winners().clone();
        let mut by_team: BTreeMap<String, Vec<(String, i64)>> = BTreeMap::new();
        for (prospect_id, entry) in &winners {
            by_team
                .entry(entry.team.clone())
                .or_default()
                .push((prospect_id.clone(), entry.price));
        }

        for (team, wins) in &by_team {
            if week.resolution().unwrap().applied_teams().contains(team) {
                continue;
            }
            if let Err(e) = self.apply_team(week, team, wins) {
                // Teams applied before this one are already persisted;
                // re-running resolve_week resumes from here.
                tracing::error!(team = %team, error = %e, "resolution apply failed");
                return (Err(e), Commit::Discard);
            }
            week.resolution_mut().unwrap().mark_applied(team);
            week.touch(now.with_timezone(&Utc));
            if let Err(e) = self.store.persist(week) {
                return (Err(e.into()), Commit::Discard);
            }
        }

        // Terminal transition: the week is processed and stays that way.
        week.resolution_mut().unwrap().mark_completed();
        week.set_phase(Phase::Processing);
        week.touch(now.with_timezone(&Utc));
        (
            Ok(ResolutionSummary::Resolved {
                week_start: week.week_start(),
                winners,
            }),
            Commit::Persist,
        )
    }

    /// Phases A and B over the week's bids and decisions
    fn compute_allocation(&self, week: &AuctionWeek) -> BTreeMap<String, WinningEntry> {
        let priority_index = week.priority_index();

        // One-shot balance snapshot for every team that bid this week.
        let bidding_teams: BTreeSet<&str> = week.bids().iter().map(|b| b.team()).collect();
        let balances: HashMap<String, i64> = bidding_teams
            .into_iter()
            .map(|team| (team.to_string(), self.ledger.balance(team)))
            .collect();

        let mut winners = compute_tentative_winners(
            week.bids(),
            week.decisions(),
            &priority_index,
            self.config.min_originating_amount,
        );
        enforce_affordability(
            &mut winners,
            week.bids(),
            week.decisions(),
            &priority_index,
            &balances,
            self.config.min_originating_amount,
        );

        winners
            .into_iter()
            .map(|(prospect_id, win)| (prospect_id, win.to_entry()))
            .collect()
    }

    /// Apply one team's wins: roster assignments, then a single debit
    fn apply_team(
        &self,
        week: &AuctionWeek,
        team: &str,
        wins: &[(String, i64)],
    ) -> Result<(), EngineError> {
        for (prospect_id, _) in wins {
            self.roster
                .assign_owner(prospect_id, team, &self.config.default_acquisition_tag)?;
        }
        let total: i64 = wins.iter().map(|(_, price)| price).sum();
        let reason = format!("prospect auction week {}", week.week_start());
        self.ledger.debit(team, total, &reason)?;
        tracing::info!(team = %team, total, prospects = wins.len(), "auction results applied");
        Ok(())
    }
}
