//! Pipeline entry points.
//!
//! - `Collector`: one comment collection run against any `Browser`
//! - `run_collector`: the same, wired to the configured WebDriver endpoint

pub mod collect;

pub use collect::{Collector, run_collector};
