pub mod documents;
pub mod health;
pub mod units;

pub use documents::{append_line, edit_line, recalculate_document, remove_line, seed_unit};
pub use health::{health_check, metrics_handler, readiness_check};
pub use units::get_unit;
