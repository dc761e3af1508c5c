//! Bulk historical bar download for futures contracts.
//!
//! For each configured symbol the history window is split into fixed-length
//! chunks, every chunk is fetched concurrently, and the responses are merged
//! into one time-ordered, de-duplicated table exported as CSV.

pub mod assembly;
pub mod auth;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod io;
pub mod models;
pub mod normalize;
pub mod partition;
pub mod pipeline;
pub mod providers;
pub mod requests;
#[cfg(test)]
mod test_support;
