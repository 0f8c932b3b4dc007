//! Legality core for documented car modifications.
//!
//! Combines bundled regulatory reference data (regional rules, law citations) with the evidence
//! stored against each modification to derive a legality status, an evidence score and the
//! remediation actions that bring a car closer to a passing TÜV inspection.

pub mod config;
pub mod error;
pub mod legality;
pub mod telemetry;
