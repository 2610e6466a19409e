//! CLI command implementations.

mod collections;
mod config;
mod doctor;
mod enrich;
mod list;

pub use collections::run_collections;
pub use config::run_config;
pub use doctor::run_doctor;
pub use enrich::{run_enrich, EnrichOverrides};
pub use list::run_list;
