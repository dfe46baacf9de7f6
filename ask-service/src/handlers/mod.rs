pub mod ask;
pub mod health;

pub use ask::{ask, method_not_allowed};
pub use health::{health_check, index, metrics_handler, not_found, readiness_check};
