//! Services module for leasing-service: the recalculation engine and its
//! supporting lookups.

pub mod aggregator;
pub mod calculator;
pub mod engine;
pub mod metrics;
pub mod period;
pub mod rounding;
pub mod unit_resolver;

pub use engine::{EngineError, RecalculationEngine, SeedOutcome};
pub use metrics::{get_metrics, init_metrics};
pub use rounding::round2;
pub use unit_resolver::{UnitCatalog, UnitResolver};
