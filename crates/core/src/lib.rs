//! Pure domain logic for the NexusOne backend.
//!
//! Everything in this crate is I/O-free: credit arithmetic, plan rules,
//! generation lifecycle rules, and polling-policy arithmetic. The db, api,
//! and worker crates depend on these rules; nothing here depends on them.

pub mod credits;
pub mod error;
pub mod generation;
pub mod plan;
pub mod polling;
pub mod types;
