//! Structural validation of incoming observation payloads
//!
//! Checks run in a fixed order and short-circuit on the first failure; the
//! whole batch is accepted or the whole batch is rejected, never partially.
//! Each rule is an independent predicate so new rules compose without
//! touching existing ones.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::models::{Batch, BatchKind, SensorData, TrafficMetrics};
use crate::utils::time::iso_to_unix;

/// Rejection reason: the offending field plus the violated rule
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("{field}: expected {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("version: {0:?} is not a supported version string")]
    UnsupportedVersion(String),

    #[error("type: {0:?} is not one of \"data\", \"optimization\"")]
    UnknownKind(String),

    #[error("timestamp: {0:?} is not a valid ISO-8601 instant")]
    InvalidTimestamp(String),

    #[error("timestamp: {unix} is outside the accepted window [{min}, {max}]")]
    TimestampOutOfRange { unix: i64, min: i64, max: i64 },

    #[error("{field}: {value:?} is not a numeric traffic light id")]
    InvalidTrafficLightId { field: String, value: String },

    #[error("sensors: batch size {got} is outside {min}..={max}")]
    BatchSize { got: usize, min: usize, max: usize },

    #[error("{field}: {value} is outside [0, 1]")]
    DensityOutOfRange { field: String, value: f64 },

    #[error("traffic_light_id {0:?} does not appear in sensors")]
    ReferenceNotInSensors(String),
}

/// Structural validator for incoming observation payloads.
///
/// Limits come from [`Config`](crate::core::Config) and are captured once at
/// startup. No I/O: rejection happens before any remote call is made.
#[derive(Debug, Clone)]
pub struct Validator {
    min_sensors: usize,
    max_sensors: usize,
    min_timestamp: i64,
    max_timestamp: i64,
}

impl Validator {
    pub fn new(min_sensors: usize, max_sensors: usize, min_timestamp: i64, max_timestamp: i64) -> Self {
        Self {
            min_sensors,
            max_sensors,
            min_timestamp,
            max_timestamp,
        }
    }

    /// Validate a decoded payload and normalize it into the canonical [`Batch`].
    pub fn validate(&self, raw: &Value) -> Result<Batch, ValidationError> {
        let version = str_field(raw, "version", "")?;
        check_version(version)?;

        let kind = parse_kind(str_field(raw, "type", "")?)?;

        let timestamp = str_field(raw, "timestamp", "")?;
        let unix_timestamp = self.check_timestamp(timestamp)?;

        let traffic_light_id = str_field(raw, "traffic_light_id", "")?;
        check_traffic_light_id("traffic_light_id", traffic_light_id)?;

        let sensors = self.collect_sensors(raw)?;

        // The nominal routing id must be one of the observed sensors
        if !sensors.iter().any(|s| s.traffic_light_id == traffic_light_id) {
            return Err(ValidationError::ReferenceNotInSensors(
                traffic_light_id.to_string(),
            ));
        }

        Ok(Batch {
            version: version.to_string(),
            kind,
            timestamp: timestamp.to_string(),
            traffic_light_id: traffic_light_id.to_string(),
            sensors,
            unix_timestamp,
        })
    }

    fn check_timestamp(&self, timestamp: &str) -> Result<i64, ValidationError> {
        let unix = iso_to_unix(timestamp)
            .map_err(|_| ValidationError::InvalidTimestamp(timestamp.to_string()))?;
        if unix < self.min_timestamp || unix > self.max_timestamp {
            return Err(ValidationError::TimestampOutOfRange {
                unix,
                min: self.min_timestamp,
                max: self.max_timestamp,
            });
        }
        Ok(unix)
    }

    fn collect_sensors(&self, raw: &Value) -> Result<Vec<SensorData>, ValidationError> {
        match raw.get("sensors") {
            Some(list) => {
                let items = list.as_array().ok_or_else(|| ValidationError::WrongType {
                    field: "sensors".to_string(),
                    expected: "array",
                })?;
                if items.len() < self.min_sensors || items.len() > self.max_sensors {
                    return Err(ValidationError::BatchSize {
                        got: items.len(),
                        min: self.min_sensors,
                        max: self.max_sensors,
                    });
                }
                items
                    .iter()
                    .enumerate()
                    .map(|(i, sensor)| validate_sensor(&format!("sensors[{i}]"), sensor))
                    .collect()
            }
            // Legacy single-sensor shape: observation fields at the top level
            None => Ok(vec![validate_sensor("", raw)?]),
        }
    }
}

fn validate_sensor(path: &str, value: &Value) -> Result<SensorData, ValidationError> {
    if !value.is_object() {
        return Err(ValidationError::WrongType {
            field: if path.is_empty() { "sensor".to_string() } else { path.to_string() },
            expected: "object",
        });
    }

    let traffic_light_id = str_field(value, "traffic_light_id", path)?;
    check_traffic_light_id(&join(path, "traffic_light_id"), traffic_light_id)?;

    let edges_value = field(value, "controlled_edges", path)?;
    let edges = edges_value
        .as_array()
        .ok_or_else(|| ValidationError::WrongType {
            field: join(path, "controlled_edges"),
            expected: "array of strings",
        })?;
    let controlled_edges = edges
        .iter()
        .map(|e| {
            e.as_str()
                .map(str::to_string)
                .ok_or_else(|| ValidationError::WrongType {
                    field: join(path, "controlled_edges"),
                    expected: "array of strings",
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let metrics = validate_metrics(&join(path, "metrics"), field(value, "metrics", path)?)?;
    let vehicle_stats =
        validate_vehicle_stats(&join(path, "vehicle_stats"), field(value, "vehicle_stats", path)?)?;

    Ok(SensorData {
        traffic_light_id: traffic_light_id.to_string(),
        controlled_edges,
        metrics,
        vehicle_stats,
    })
}

fn validate_metrics(path: &str, value: &Value) -> Result<TrafficMetrics, ValidationError> {
    let vehicles_per_minute = uint_field(value, "vehicles_per_minute", path).and_then(|n| {
        u32::try_from(n).map_err(|_| ValidationError::WrongType {
            field: join(path, "vehicles_per_minute"),
            expected: "non-negative integer",
        })
    })?;
    let avg_speed_kmh = non_negative_field(value, "avg_speed_kmh", path)?;
    let avg_circulation_time_sec = non_negative_field(value, "avg_circulation_time_sec", path)?;
    let density = non_negative_field(value, "density", path)?;

    if density > 1.0 {
        return Err(ValidationError::DensityOutOfRange {
            field: join(path, "density"),
            value: density,
        });
    }

    Ok(TrafficMetrics {
        vehicles_per_minute,
        avg_speed_kmh,
        avg_circulation_time_sec,
        density,
    })
}

fn validate_vehicle_stats(
    path: &str,
    value: &Value,
) -> Result<BTreeMap<String, u64>, ValidationError> {
    let obj = value.as_object().ok_or_else(|| ValidationError::WrongType {
        field: path.to_string(),
        expected: "object",
    })?;

    let mut stats = BTreeMap::new();
    for (class, count) in obj {
        let n = count.as_u64().ok_or_else(|| ValidationError::WrongType {
            field: join(path, class),
            expected: "non-negative integer",
        })?;
        stats.insert(class.clone(), n);
    }
    Ok(stats)
}

// ── Predicate helpers ───────────────────────────────────────────────

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn field<'a>(value: &'a Value, name: &str, path: &str) -> Result<&'a Value, ValidationError> {
    value
        .get(name)
        .ok_or_else(|| ValidationError::MissingField(join(path, name)))
}

fn str_field<'a>(value: &'a Value, name: &str, path: &str) -> Result<&'a str, ValidationError> {
    field(value, name, path)?
        .as_str()
        .ok_or_else(|| ValidationError::WrongType {
            field: join(path, name),
            expected: "string",
        })
}

fn uint_field(value: &Value, name: &str, path: &str) -> Result<u64, ValidationError> {
    field(value, name, path)?
        .as_u64()
        .ok_or_else(|| ValidationError::WrongType {
            field: join(path, name),
            expected: "non-negative integer",
        })
}

fn non_negative_field(value: &Value, name: &str, path: &str) -> Result<f64, ValidationError> {
    let n = field(value, name, path)?
        .as_f64()
        .ok_or_else(|| ValidationError::WrongType {
            field: join(path, name),
            expected: "number",
        })?;
    if n < 0.0 {
        return Err(ValidationError::WrongType {
            field: join(path, name),
            expected: "non-negative number",
        });
    }
    Ok(n)
}

/// Version strings are dotted decimals: "2", "2.0", "1.2.3"
fn check_version(version: &str) -> Result<(), ValidationError> {
    let ok = !version.is_empty()
        && version
            .split('.')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedVersion(version.to_string()))
    }
}

fn parse_kind(kind: &str) -> Result<BatchKind, ValidationError> {
    match kind {
        "data" => Ok(BatchKind::Data),
        "optimization" => Ok(BatchKind::Optimization),
        other => Err(ValidationError::UnknownKind(other.to_string())),
    }
}

fn check_traffic_light_id(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidTrafficLightId {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> Validator {
        Validator::new(1, 10, 946684800, 4102444800)
    }

    fn sensor_json(tls: &str) -> Value {
        json!({
            "traffic_light_id": tls,
            "controlled_edges": ["edge_n", "edge_s"],
            "metrics": {
                "vehicles_per_minute": 65,
                "avg_speed_kmh": 32.5,
                "avg_circulation_time_sec": 48.0,
                "density": 0.72
            },
            "vehicle_stats": {"motorcycle": 3, "car": 55, "bus": 2, "truck": 5}
        })
    }

    fn batch_json(sensors: Vec<Value>) -> Value {
        json!({
            "version": "2.0",
            "type": "data",
            "timestamp": "2025-05-19T14:20:00Z",
            "traffic_light_id": "21",
            "sensors": sensors
        })
    }

    #[test]
    fn accepts_valid_batch() {
        let batch = validator().validate(&batch_json(vec![sensor_json("21")])).unwrap();
        assert_eq!(batch.kind, BatchKind::Data);
        assert_eq!(batch.traffic_light_id, "21");
        assert_eq!(batch.sensors.len(), 1);
        assert_eq!(batch.sensors[0].metrics.vehicles_per_minute, 65);
        assert_eq!(batch.unix_timestamp, 1747664400);
    }

    #[test]
    fn accepts_up_to_ten_sensors() {
        let sensors: Vec<Value> = (0..10).map(|_| sensor_json("21")).collect();
        assert!(validator().validate(&batch_json(sensors)).is_ok());
    }

    #[test]
    fn rejects_empty_and_oversized_batches() {
        let err = validator().validate(&batch_json(vec![])).unwrap_err();
        assert_eq!(err, ValidationError::BatchSize { got: 0, min: 1, max: 10 });

        let sensors: Vec<Value> = (0..11).map(|_| sensor_json("21")).collect();
        let err = validator().validate(&batch_json(sensors)).unwrap_err();
        assert_eq!(err, ValidationError::BatchSize { got: 11, min: 1, max: 10 });
    }

    #[test]
    fn rejects_missing_fields_naming_the_field() {
        let mut raw = batch_json(vec![sensor_json("21")]);
        raw.as_object_mut().unwrap().remove("timestamp");
        assert_eq!(
            validator().validate(&raw).unwrap_err(),
            ValidationError::MissingField("timestamp".to_string())
        );

        let mut sensor = sensor_json("21");
        sensor.as_object_mut().unwrap().remove("metrics");
        assert_eq!(
            validator().validate(&batch_json(vec![sensor])).unwrap_err(),
            ValidationError::MissingField("sensors[0].metrics".to_string())
        );
    }

    #[test]
    fn rejects_non_numeric_traffic_light_id() {
        let mut raw = batch_json(vec![sensor_json("21")]);
        raw["traffic_light_id"] = json!("abc");
        let err = validator().validate(&raw).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTrafficLightId { .. }));
    }

    #[test]
    fn rejects_unknown_type() {
        let mut raw = batch_json(vec![sensor_json("21")]);
        raw["type"] = json!("telemetry");
        assert_eq!(
            validator().validate(&raw).unwrap_err(),
            ValidationError::UnknownKind("telemetry".to_string())
        );
    }

    #[test]
    fn rejects_bad_version_strings() {
        for bad in ["", "v2", "2.", "2..0", "2.0-beta"] {
            let mut raw = batch_json(vec![sensor_json("21")]);
            raw["version"] = json!(bad);
            assert!(
                matches!(
                    validator().validate(&raw).unwrap_err(),
                    ValidationError::UnsupportedVersion(_)
                ),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn rejects_unparseable_and_out_of_window_timestamps() {
        let mut raw = batch_json(vec![sensor_json("21")]);
        raw["timestamp"] = json!("yesterday");
        assert!(matches!(
            validator().validate(&raw).unwrap_err(),
            ValidationError::InvalidTimestamp(_)
        ));

        let mut raw = batch_json(vec![sensor_json("21")]);
        raw["timestamp"] = json!("1999-12-31T23:59:59Z");
        assert!(matches!(
            validator().validate(&raw).unwrap_err(),
            ValidationError::TimestampOutOfRange { .. }
        ));
    }

    #[test]
    fn rejects_density_above_one() {
        let mut sensor = sensor_json("21");
        sensor["metrics"]["density"] = json!(1.5);
        let err = validator().validate(&batch_json(vec![sensor])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DensityOutOfRange {
                field: "sensors[0].metrics.density".to_string(),
                value: 1.5
            }
        );
    }

    #[test]
    fn rejects_negative_vehicle_counts() {
        let mut sensor = sensor_json("21");
        sensor["vehicle_stats"]["car"] = json!(-1);
        let err = validator().validate(&batch_json(vec![sensor])).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { .. }));
    }

    #[test]
    fn rejects_reference_id_not_among_sensors() {
        let mut raw = batch_json(vec![sensor_json("22")]);
        raw["traffic_light_id"] = json!("21");
        assert_eq!(
            validator().validate(&raw).unwrap_err(),
            ValidationError::ReferenceNotInSensors("21".to_string())
        );
    }

    #[test]
    fn normalizes_legacy_single_sensor_shape() {
        let legacy = json!({
            "version": "2.0",
            "type": "data",
            "timestamp": "2025-05-19T14:20:00Z",
            "traffic_light_id": "21",
            "controlled_edges": ["edge_n", "edge_s"],
            "metrics": {
                "vehicles_per_minute": 65,
                "avg_speed_kmh": 32.5,
                "avg_circulation_time_sec": 48.0,
                "density": 0.72
            },
            "vehicle_stats": {"motorcycle": 3, "car": 55, "bus": 2, "truck": 5}
        });

        let batch = validator().validate(&legacy).unwrap();
        let canonical = validator()
            .validate(&batch_json(vec![sensor_json("21")]))
            .unwrap();

        // Legacy shape validates identically to a one-element batch
        assert_eq!(batch, canonical);
    }
}
