//! Time and schedule management for the auction engine

pub mod schedule;
