//! Prospect Auction Core - Rust Engine
//!
//! Weekly prospect-auction engine: phase-gated bidding with a validated
//! write path and a budget-respecting Sunday resolution pass.
//!
//! # Architecture
//!
//! - **core**: schedule resolver (pure wall-clock → phase mapping)
//! - **models**: domain types (Bid, MatchDecision, AuctionWeek)
//! - **store**: per-week persisted records with per-week locking
//! - **collaborators**: roster / ledger / standings contracts and fakes
//! - **engine**: the operations (place_bid, record_decision, resolve_week)
//! - **resolution**: pure allocation logic behind resolve_week
//!
//! # Critical Invariants
//!
//! 1. All currency values are i64 whole units
//! 2. Every operation takes `now` explicitly; nothing reads a clock
//! 3. Mutations are linearized per week by the store's locks
//! 4. Bids and decisions are append-only and final

// Module declarations
pub mod collaborators;
pub mod core;
pub mod engine;
pub mod models;
pub mod resolution;
pub mod store;

// Re-exports for convenience
pub use collaborators::{
    CollaboratorError, LedgerStore, RosterItem, RosterStore, StandingsSource,
};
pub use crate::core::schedule::{Phase, SeasonSchedule};
pub use engine::{AuctionConfig, AuctionEngine, EngineError, PlacedBid, Rejection};
pub use models::{
    bid::{Bid, BidKind},
    decision::{Decision, MatchDecision, ParseDecisionError},
    week::{AuctionWeek, WeekResolution, WinningEntry},
};
pub use resolution::{ResolutionSummary, TentativeWin, WinSource};
pub use store::{StoreError, WeekStore};
