//! Default-risk scoring for commercial real-estate loan underwriting.
//!
//! The [`underwriting`] module holds the scoring engine; `config`, `error`, and
//! `telemetry` carry the process plumbing shared with the API service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod underwriting;
