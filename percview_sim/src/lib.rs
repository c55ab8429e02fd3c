//! PercView Scenario Harness
//!
//! Drives the perception overlay the way a simulator host would, without a
//! simulator: a seeded feed publishes detection messages on an in-process
//! topic, and a frame loop calls the overlay once per tick.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  DetectionArray   ┌──────────────────┐
//! │PerceptionFeed│ ────────────────► │ ChannelTransport │
//! │  (seeded)    │     publish       └────────┬─────────┘
//! └──────────────┘                            │ subscription task
//!                                             ▼
//!                                   ┌──────────────────┐
//!   OriginSlot (dropout window) ──► │PerceptionVisualizer│ ──► HarnessRenderer
//!                                   └──────────────────┘       (checks, export, Rerun)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use percview_sim::{run_scenario, RunConfig};
//! use percview_sim::scenarios::ScenarioId;
//!
//! let result = run_scenario(RunConfig::new(ScenarioId::Intersection, 42), None).await?;
//! assert!(result.passed);
//! ```

mod exporter;
mod feed;
mod runner;
pub mod scenarios;

pub use exporter::{ExportedBox, SimExport, SimFrame};
pub use feed::{PerceptionFeed, SimObject};
pub use runner::{run_scenario, HarnessRenderer, RunConfig, ScenarioResult, SimError};
