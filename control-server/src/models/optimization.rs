//! Optimization result wire models

use serde::{Deserialize, Serialize};

use super::BatchKind;

/// Signal timing proposed by the sync collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationDetails {
    pub green_time_sec: i64,
    pub red_time_sec: i64,
}

/// Congestion impact estimate attached to an optimization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactDetails {
    pub original_congestion: i64,
    pub optimized_congestion: i64,
    /// One of "none", "mild", "severe"
    pub original_category: String,
    pub optimized_category: String,
}

/// One optimized result for one input sensor.
///
/// Ordering is a correctness invariant: result\[i\] corresponds to sensors\[i\].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationData {
    pub version: String,
    #[serde(rename = "type")]
    pub kind: BatchKind,
    pub timestamp: String,
    pub traffic_light_id: String,
    pub optimization: OptimizationDetails,
    pub impact: ImpactDetails,
}

/// Storage shape for a finalized optimization run: the per-sensor results
/// wrapped under one reference header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationBatch {
    pub version: String,
    #[serde(rename = "type")]
    pub kind: BatchKind,
    pub timestamp: String,
    pub traffic_light_id: String,
    pub optimizations: Vec<OptimizationData>,
}

impl OptimizationBatch {
    /// Wrap per-sensor results into the storage shape. The header fields come
    /// from the first result; all results of one run share the same instant.
    /// Returns `None` for an empty result set.
    pub fn from_results(results: Vec<OptimizationData>) -> Option<Self> {
        let (version, timestamp, traffic_light_id) = {
            let first = results.first()?;
            (
                first.version.clone(),
                first.timestamp.clone(),
                first.traffic_light_id.clone(),
            )
        };
        Some(Self {
            version,
            kind: BatchKind::Optimization,
            timestamp,
            traffic_light_id,
            optimizations: results,
        })
    }
}
