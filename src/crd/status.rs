//! # CheCluster Status
//!
//! Exposure results recorded on the CheCluster after each pass.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status of the CheCluster resource, as far as exposure is concerned
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheClusterStatus {
    /// Active exposure mode: multi-host, single-host-gateway or single-host-direct
    #[serde(default)]
    pub exposure_mode: Option<String>,
    /// Externally reachable address per exposed endpoint
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
    /// Conditions represent the latest available observations
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Time of the last pass in which every endpoint was exposed (RFC3339)
    #[serde(default)]
    pub last_exposure_time: Option<String>,
}

/// Condition represents a status condition for the resource
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of condition (True, False, Unknown)
    pub status: String,
    /// Last transition time
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing condition
    #[serde(default)]
    pub message: Option<String>,
}
