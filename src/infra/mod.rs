//! Infrastructure concerns: telemetry installation.

pub mod telemetry;
