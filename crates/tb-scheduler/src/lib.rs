//! List scheduler (§4.G): per-block ready-set dispatch with latency-guided
//! selection, projection stickiness, and phi seeding.

mod latency;
mod list_scheduler;

pub use latency::{DefaultLatencyModel, LatencyModel};
pub use list_scheduler::{schedule_block, SchedulerError};
