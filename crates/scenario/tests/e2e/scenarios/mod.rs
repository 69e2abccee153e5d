//! E2E test scenarios.
//!
//! Each module covers one feature area of the step vocabulary.

mod dispatch;
mod ingress;
mod managed_mode;
mod mesh_requests;
mod xfail;
