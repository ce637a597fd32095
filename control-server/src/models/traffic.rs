//! Traffic observation wire models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payload kind accepted by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchKind {
    Data,
    Optimization,
}

impl BatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchKind::Data => "data",
            BatchKind::Optimization => "optimization",
        }
    }
}

impl std::fmt::Display for BatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-sensor traffic metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficMetrics {
    pub vehicles_per_minute: u32,
    pub avg_speed_kmh: f64,
    pub avg_circulation_time_sec: f64,
    /// Normalized occupancy, 0.0 (empty) to 1.0 (saturated)
    pub density: f64,
}

/// One sensor's reading at one traffic light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    pub traffic_light_id: String,
    pub controlled_edges: Vec<String>,
    pub metrics: TrafficMetrics,
    /// Vehicle counts by class (motorcycle, car, bus, truck, ...)
    pub vehicle_stats: BTreeMap<String, u64>,
}

/// One orchestration unit: 1-10 sensor observations under one timestamp.
///
/// The legacy single-sensor shape (observation fields at the top level) is
/// normalized into a one-element `sensors` batch by the validator, so the
/// pipeline only ever sees this canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub version: String,
    #[serde(rename = "type")]
    pub kind: BatchKind,
    /// ISO-8601 instant as received on the wire
    pub timestamp: String,
    /// Nominal routing id; must appear among the sensors' ids
    pub traffic_light_id: String,
    pub sensors: Vec<SensorData>,
    /// Unix seconds of `timestamp`, filled in by the validator. Internal,
    /// never serialized back out.
    #[serde(skip)]
    pub unix_timestamp: i64,
}
