//! This module defines and re-exports the interfaces for the vote repository.
//! It serves as a central point for accessing traits related to data interaction.
mod vote_repository;

pub use vote_repository::{VoteRepository, VoteTransaction};
