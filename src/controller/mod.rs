//! # Controller
//!
//! Controller plumbing around the exposure core.
//!
//! - `backoff`: Fibonacci backoff mechanism for retries
//! - `duration`: Kubernetes duration parsing
//! - `server`: HTTP server for metrics and health checks

pub mod backoff;
pub mod duration;
pub mod server;
