//! Vehicle inspection workflows and compliance scoring for transport fleets.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
