//! # Runtime
//!
//! - `initialization`: process setup (crypto provider, tracing, metrics, server, client, platform probe)
//! - `convergence`: the pass loop driving the exposure core

pub mod convergence;
pub mod initialization;
