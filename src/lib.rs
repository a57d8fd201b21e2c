//! Pocket Network transfer-and-relay client library.

pub mod config;
pub mod error;
pub mod observability;
pub mod pocket;
pub mod resilience;
pub mod scenario;

pub use config::schema::DemoConfig;
pub use error::{DemoError, DemoResult};
pub use scenario::{run_scenario, PocketToolkit, ScenarioReport, Toolkit};
