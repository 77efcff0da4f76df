//! AffiMark product verifier: affiliate viability verdicts and ranked
//! alternatives, plus the configuration, telemetry and HTTP plumbing around them.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod verifier;
