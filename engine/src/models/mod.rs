//! Domain types for the weekly prospect auction
//!
//! - **bid**: originating and challenge bids
//! - **decision**: match / forfeit decisions from originating managers
//! - **week**: the persisted per-week auction record

pub mod bid;
pub mod decision;
pub mod week;
