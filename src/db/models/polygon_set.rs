use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::StoredCoordinate;

/// Named snapshot of the coordinate working set. `polygons` is a value copy
/// taken at snapshot time; later edits to the live collection do not reach
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonSet {
    pub name: String,
    pub description: Option<String>,
    pub polygons: Vec<StoredCoordinate>,
    pub created_at: DateTime<Utc>,
}
