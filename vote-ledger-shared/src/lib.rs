//! # Vote Ledger Shared
//! This crate defines shared data structures and types used across the vote ledger crates.
//! It includes item references, vote directions, vote records (with their legacy
//! encodings), item tallies and the per-voter vote transition.
pub mod types;
