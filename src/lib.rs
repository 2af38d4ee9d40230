//! Periodically fetches JSON from a fixed set of REST endpoints and stores
//! each payload as a timestamped object in blob storage.

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod logging;
pub mod pipeline;
pub mod registry;
pub mod triggers;
