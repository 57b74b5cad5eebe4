//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use serde::{Deserialize, Serialize};

/// contact.submit.v1 - Submit the contact form
#[derive(Debug, Deserialize)]
pub struct ContactSubmitRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactSubmitResponse {
    pub status: String,
    pub message: String,
}

/// health.check.v1 - Liveness check (no parameters)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// admin.stats.v1 - Queue and worker statistics (no parameters)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsResponse {
    pub pending: u64,
    pub unfinished: u64,
    pub worker_state: String,
    pub sent: u64,
    pub failed: u64,
    pub internal_errors: u64,
    pub uptime_seconds: u64,
}
