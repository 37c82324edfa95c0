//! Flight status tracking: provider lookups, status mapping, cache tiers,
//! transition detection, and the periodic jobs that drive them.

pub mod cache_policy;
pub mod fetcher;
pub mod handlers;
pub mod jobs;
pub mod provider;
pub mod retention;
pub mod scheduler;
pub mod status_map;
pub mod transition;
