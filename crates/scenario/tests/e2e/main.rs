//! End-to-end tests for meshcheck-scenario.
//!
//! These tests run whole feature documents through [`FeatureRunner`] against a
//! scripted [`MockRunner`], so every provisioning, convergence, query and probe
//! command is observable without a live cluster.
//!
//! # Test Structure
//!
//! - `helpers/` -- harness construction, status fixtures, feature builders
//! - `scenarios/` -- test files organized by feature area
//!
//! # Running
//!
//! ```bash
//! cargo test -p meshcheck-scenario --test e2e
//! ```
//!
//! [`FeatureRunner`]: meshcheck_scenario::FeatureRunner
//! [`MockRunner`]: meshcheck_core::process::MockRunner

mod helpers;
mod scenarios;
