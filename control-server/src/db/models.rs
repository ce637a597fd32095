//! Metadata row models

use serde::Serialize;
use sqlx::FromRow;

/// One row of the metadata index — bookkeeping for one pipeline recording step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct MetadataRecord {
    pub id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    /// Unix seconds of the batch instant (part of the composite key)
    pub timestamp: i64,
    pub traffic_light_id: String,
    pub sensor_count: i64,
    /// Pipeline stage reached when the row was written ("uploaded" / "optimized")
    pub stage: String,
    /// Unix milliseconds of row creation
    pub created_at: i64,
}

/// Insert payload for a metadata row
#[derive(Debug, Clone)]
pub struct NewMetadataRecord {
    pub kind: String,
    pub timestamp: i64,
    pub traffic_light_id: String,
    pub sensor_count: i64,
    pub stage: String,
}

/// Aggregate counts over the metadata index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct MetadataStats {
    pub total_entries: i64,
    pub data_entries: i64,
    pub optimization_entries: i64,
    pub unique_traffic_lights: i64,
}
