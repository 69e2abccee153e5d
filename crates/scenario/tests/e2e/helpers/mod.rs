//! Shared E2E test helpers.
//!
//! Provides a mock-backed harness builder, juju status fixtures, and small
//! builders for feature documents.

pub mod cluster;
pub mod features;
