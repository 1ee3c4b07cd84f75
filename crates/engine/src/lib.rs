//! Drop lifecycle engine: create, retrieve, delete and download drops, and
//! sweep expired ones in the background.

pub mod builder;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod sweeper;

pub use builder::DropEngineBuilder;
pub use engine::{DropEngine, EngineConfig, MAX_DOWNLOADS_CAP};
pub use error::EngineError;
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use sweeper::{ExpirySweeper, SweepFailure, SweepReport, SweeperConfig};
