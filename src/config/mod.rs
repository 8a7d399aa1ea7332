//! # Configuration
//!
//! - `controller`: controller-level settings from environment variables

pub mod controller;

pub use controller::ControllerConfig;
