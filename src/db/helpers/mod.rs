use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::db::models::{Point, StoredCoordinate};

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn encode_points(points: &[Point]) -> Result<String> {
    serde_json::to_string(points).map_err(|err| anyhow!("failed to encode points: {err}"))
}

pub fn decode_points(raw: &str, field: &str) -> Result<Vec<Point>> {
    serde_json::from_str(raw).with_context(|| format!("failed to decode {field}"))
}

pub fn encode_polygons(polygons: &[StoredCoordinate]) -> Result<String> {
    serde_json::to_string(polygons).map_err(|err| anyhow!("failed to encode polygons: {err}"))
}

pub fn decode_polygons(raw: &str, field: &str) -> Result<Vec<StoredCoordinate>> {
    serde_json::from_str(raw).with_context(|| format!("failed to decode {field}"))
}
