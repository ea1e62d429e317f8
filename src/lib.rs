//! Time Keeper E2E Suite
//!
//! A Rust-controlled end-to-end test suite for the Time Keeper timezone
//! board that:
//! - Spawns the app under test as a subprocess (or attaches to a running one)
//! - Compiles semantic page actions into Playwright scripts run under Node
//! - Asserts UI state in-browser and verifies table ordering with a pure
//!   Rust oracle
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Scenario Runner (Rust)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioRunner                                             │
//! │    ├── start_app() -> AppHandle                             │
//! │    ├── run_scenario(scenario) -> ScenarioResult             │
//! │    └── write_results(suite) -> test-results.json            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario = steps + optional Rust-side verify               │
//! │    ├── steps built by TimezonePage (page object)            │
//! │    │     goto / add_timezone / delete_timezone / expect_*   │
//! │    ├── compiled to one Playwright script per scenario       │
//! │    └── verify: oracle::verify_time_order over captured rows │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod error;
pub mod oracle;
pub mod page;
pub mod playwright;
pub mod runner;
pub mod scenarios;
pub mod spec;
pub mod step;

pub use error::{E2eError, E2eResult};
pub use page::TimezonePage;
pub use runner::ScenarioRunner;
pub use scenarios::Scenario;
pub use spec::ScenarioSpec;
pub use step::PageStep;
