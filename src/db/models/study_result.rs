use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post-task questionnaire answers. Likert fields are 1-5 ratings; the two
/// text fields hold "yes"/"no" answers about prior awareness of visual
/// snow. Every field is optional and defaults to absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Questionnaire {
    pub frustrated: Option<i64>,
    pub challenged: Option<i64>,
    pub happy: Option<i64>,
    pub angry: Option<i64>,
    pub upset: Option<i64>,
    pub defeated: Option<i64>,
    pub content: Option<i64>,
    pub joyful: Option<i64>,
    pub heard_visual_snow: Option<String>,
    pub have_visual_snow: Option<String>,
}

/// One completed study run. Immutable once written; `created_at` is
/// server-assigned and serialized as `timestamp` in the export format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyResult {
    pub id: i64,
    pub username: String,
    pub score: i64,
    pub time_ms: i64,
    pub clicks: i64,
    pub found_objects: i64,
    pub target_objects: i64,
    pub image_mode: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub questionnaire: Questionnaire,
}

/// Insert payload for a study result; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewStudyResult {
    pub username: String,
    pub score: i64,
    pub time_ms: i64,
    pub clicks: i64,
    pub found_objects: i64,
    pub target_objects: i64,
    pub image_mode: String,
    pub questionnaire: Questionnaire,
}

/// Optional narrowing of a result listing: exact image-mode match and
/// case-insensitive username substring match.
#[derive(Debug, Clone, Default)]
pub struct ResultFilter {
    pub image_mode: Option<String>,
    pub username: Option<String>,
}
