use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use warp::{Rejection, Reply};

use crate::db::models::{
    NewStudyResult, Point, PolygonSet, Questionnaire, ResultFilter, StoredCoordinate,
};
use crate::db::Database;
use crate::server::error::{reject, ApiError};
use crate::server::session::{with_session_cookie, SessionStore};
use crate::settings::Settings;
use crate::snow::{self, SnowParams, SnowSynthesizer};

#[derive(Debug, Deserialize)]
pub struct CreateCoordinatePayload {
    pub label: Option<String>,
    pub points: Option<Vec<Point>>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteCoordinatesQuery {
    pub id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotPolygonSetPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct LoadPolygonSetPayload {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeletePolygonSetQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateImageQuery {
    pub brightness: Option<f32>,
    pub noise: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnairePayload {
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

impl From<QuestionnairePayload> for Questionnaire {
    fn from(payload: QuestionnairePayload) -> Self {
        Self {
            frustrated: payload.frustrated,
            challenged: payload.challenged,
            happy: payload.happy,
            angry: payload.angry,
            upset: payload.upset,
            defeated: payload.defeated,
            content: payload.content,
            joyful: payload.joyful,
            heard_visual_snow: payload.heard_visual_snow,
            have_visual_snow: payload.have_visual_snow,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScorePayload {
    pub username: Option<String>,
    pub score: Option<i64>,
    pub time: Option<i64>,
    pub clicks: Option<i64>,
    pub found_objects: Option<i64>,
    pub target_objects: Option<i64>,
    pub image_mode: Option<String>,
    pub questionnaire: Option<QuestionnairePayload>,
}

impl SubmitScorePayload {
    /// Checks the six required fields in submission order, naming the first
    /// missing one.
    fn into_new_result(self) -> Result<NewStudyResult, ApiError> {
        Ok(NewStudyResult {
            username: self
                .username
                .ok_or(ApiError::MissingField("username"))?,
            score: self.score.ok_or(ApiError::MissingField("score"))?,
            time_ms: self.time.ok_or(ApiError::MissingField("time"))?,
            clicks: self.clicks.ok_or(ApiError::MissingField("clicks"))?,
            found_objects: self
                .found_objects
                .ok_or(ApiError::MissingField("foundObjects"))?,
            target_objects: self
                .target_objects
                .ok_or(ApiError::MissingField("targetObjects"))?,
            image_mode: self.image_mode.unwrap_or_else(|| "normal".to_string()),
            questionnaire: self.questionnaire.map(Into::into).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    pub image_mode: Option<String>,
    pub username: Option<String>,
}

fn storage(err: anyhow::Error) -> Rejection {
    reject(ApiError::Storage(err))
}

pub async fn list_coordinates(db: Database) -> Result<impl Reply, Rejection> {
    let coordinates = db.list_coordinates().await.map_err(storage)?;
    Ok(warp::reply::json(&coordinates))
}

pub async fn create_coordinate(
    payload: CreateCoordinatePayload,
    db: Database,
) -> Result<impl Reply, Rejection> {
    let coordinate = db
        .insert_coordinate(
            payload.label.unwrap_or_default(),
            payload.points.unwrap_or_default(),
        )
        .await
        .map_err(storage)?;

    Ok(warp::reply::json(
        &json!({ "success": true, "id": coordinate.id }),
    ))
}

pub async fn replace_coordinates(
    coordinates: Vec<StoredCoordinate>,
    db: Database,
) -> Result<impl Reply, Rejection> {
    db.replace_coordinates(coordinates).await.map_err(storage)?;
    Ok(warp::reply::json(&json!({ "success": true })))
}

pub async fn delete_coordinates(
    query: DeleteCoordinatesQuery,
    db: Database,
) -> Result<impl Reply, Rejection> {
    match query.id {
        Some(id) => {
            let deleted = db.delete_coordinate(id).await.map_err(storage)?;
            if !deleted {
                return Err(reject(ApiError::NotFound("Coordinate")));
            }
        }
        None => db.clear_coordinates().await.map_err(storage)?,
    }

    Ok(warp::reply::json(&json!({ "success": true })))
}

pub async fn list_polygon_sets(db: Database) -> Result<impl Reply, Rejection> {
    let sets = db.list_polygon_sets().await.map_err(storage)?;
    let by_name: BTreeMap<String, PolygonSet> =
        sets.into_iter().map(|set| (set.name.clone(), set)).collect();
    Ok(warp::reply::json(&by_name))
}

/// Snapshot the current coordinate working set under a name, overwriting
/// any snapshot already stored there.
pub async fn snapshot_polygon_set(
    payload: SnapshotPolygonSetPayload,
    db: Database,
) -> Result<impl Reply, Rejection> {
    let name = payload
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| reject(ApiError::Validation("Set name is required".into())))?;

    let polygons = db.list_coordinates().await.map_err(storage)?;
    let set = PolygonSet {
        name: name.clone(),
        description: payload.description,
        polygons,
        created_at: payload.created_at.unwrap_or_else(Utc::now),
    };
    db.upsert_polygon_set(set).await.map_err(storage)?;

    Ok(warp::reply::json(
        &json!({ "success": true, "set_name": name }),
    ))
}

/// Copy a named snapshot back into the live coordinate working set.
pub async fn load_polygon_set(
    payload: LoadPolygonSetPayload,
    db: Database,
) -> Result<impl Reply, Rejection> {
    let name = payload
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| reject(ApiError::Validation("Set name is required".into())))?;

    let set = db
        .get_polygon_set(name)
        .await
        .map_err(storage)?
        .ok_or_else(|| reject(ApiError::NotFound("Set")))?;

    db.replace_coordinates(set.polygons.clone())
        .await
        .map_err(storage)?;

    Ok(warp::reply::json(
        &json!({ "success": true, "coordinates": set.polygons }),
    ))
}

pub async fn delete_polygon_set(
    query: DeletePolygonSetQuery,
    db: Database,
) -> Result<impl Reply, Rejection> {
    let name = query
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| reject(ApiError::Validation("Set name is required".into())))?;

    let deleted = db.delete_polygon_set(name).await.map_err(storage)?;
    if !deleted {
        return Err(reject(ApiError::NotFound("Set")));
    }

    Ok(warp::reply::json(&json!({ "success": true })))
}

pub async fn generate_image(
    query: GenerateImageQuery,
    settings: Arc<Settings>,
) -> Result<impl Reply, Rejection> {
    let params = SnowParams::live(
        query.brightness.unwrap_or(1.0),
        query.noise.unwrap_or(0.4),
    );
    let image_path = settings.study_image.clone();

    let bytes = tokio::task::spawn_blocking(move || {
        let source = snow::load_source(&image_path)?;
        let mut synthesizer = SnowSynthesizer::new();
        snow::encode_jpeg(&synthesizer.apply(&source, &params))
    })
    .await
    .map_err(|err| reject(ApiError::Processing(anyhow::Error::new(err))))?
    .map_err(|err| reject(ApiError::Processing(err)))?;

    let response = warp::http::Response::builder()
        .header("content-type", "image/jpeg")
        .body(bytes)
        .map_err(|err| reject(ApiError::Processing(anyhow::Error::new(err))))?;
    Ok(response)
}

pub async fn submit_score(
    payload: SubmitScorePayload,
    sid: String,
    sessions: SessionStore,
    db: Database,
) -> Result<impl Reply, Rejection> {
    let new = payload.into_new_result().map_err(reject)?;
    db.insert_result(new).await.map_err(storage)?;
    sessions.mark_test_completed(&sid);

    let reply = warp::reply::json(&json!({
        "success": true,
        "message": "Study data submitted successfully",
    }));
    Ok(with_session_cookie(reply, &sid))
}

pub async fn export_data(db: Database) -> Result<impl Reply, Rejection> {
    let results = db
        .list_results(ResultFilter::default())
        .await
        .map_err(storage)?;
    Ok(warp::reply::json(&results))
}

pub async fn admin_results(
    query: ResultsQuery,
    sid: String,
    sessions: SessionStore,
    db: Database,
) -> Result<impl Reply, Rejection> {
    if !sessions.is_admin(&sid) {
        return Err(reject(ApiError::AuthRequired));
    }

    let filter = ResultFilter {
        image_mode: query.image_mode.filter(|mode| !mode.is_empty()),
        username: query.username.filter(|name| !name.is_empty()),
    };
    let results = db.list_results(filter).await.map_err(storage)?;

    Ok(warp::reply::json(&json!({
        "success": true,
        "count": results.len(),
        "results": results,
    })))
}
