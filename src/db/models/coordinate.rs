use serde::{Deserialize, Serialize};

/// Single vertex of a clickable polygon, in study-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One clickable target region of the study image. The working set of these
/// is what the admin editor manipulates; the study page reads it to decide
/// which clicks count as a found object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCoordinate {
    pub id: i64,
    pub label: String,
    pub points: Vec<Point>,
}
