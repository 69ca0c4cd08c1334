//! Pollen Telemetry - Logging Infrastructure
//!
//! Installs the `tracing` subscriber for the API server. Request spans come
//! from tower-http's `TraceLayer` in the router.

pub mod tracer;

pub use tracer::{init_tracer, LogFormat, TelemetryConfig};
