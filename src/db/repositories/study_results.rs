use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::{
    helpers::parse_datetime,
    models::{NewStudyResult, Questionnaire, ResultFilter, StudyResult},
    Database,
};

const RESULT_COLUMNS: &str = "id, username, score, time_ms, clicks, found_objects, \
     target_objects, image_mode, created_at, frustrated, challenged, happy, angry, \
     upset, defeated, content, joyful, heard_visual_snow, have_visual_snow";

fn row_to_result(row: &Row) -> Result<StudyResult> {
    let created_at: String = row.get("created_at")?;

    Ok(StudyResult {
        id: row.get("id")?,
        username: row.get("username")?,
        score: row.get("score")?,
        time_ms: row.get("time_ms")?,
        clicks: row.get("clicks")?,
        found_objects: row.get("found_objects")?,
        target_objects: row.get("target_objects")?,
        image_mode: row.get("image_mode")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        questionnaire: Questionnaire {
            frustrated: row.get("frustrated")?,
            challenged: row.get("challenged")?,
            happy: row.get("happy")?,
            angry: row.get("angry")?,
            upset: row.get("upset")?,
            defeated: row.get("defeated")?,
            content: row.get("content")?,
            joyful: row.get("joyful")?,
            heard_visual_snow: row.get("heard_visual_snow")?,
            have_visual_snow: row.get("have_visual_snow")?,
        },
    })
}

impl Database {
    pub async fn insert_result(&self, new: NewStudyResult) -> Result<StudyResult> {
        self.execute(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO study_results (username, score, time_ms, clicks, found_objects,
                     target_objects, image_mode, created_at, frustrated, challenged, happy,
                     angry, upset, defeated, content, joyful, heard_visual_snow,
                     have_visual_snow)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                     ?16, ?17, ?18)",
                params![
                    new.username,
                    new.score,
                    new.time_ms,
                    new.clicks,
                    new.found_objects,
                    new.target_objects,
                    new.image_mode,
                    now.to_rfc3339(),
                    new.questionnaire.frustrated,
                    new.questionnaire.challenged,
                    new.questionnaire.happy,
                    new.questionnaire.angry,
                    new.questionnaire.upset,
                    new.questionnaire.defeated,
                    new.questionnaire.content,
                    new.questionnaire.joyful,
                    new.questionnaire.heard_visual_snow,
                    new.questionnaire.have_visual_snow,
                ],
            )?;

            Ok(StudyResult {
                id: conn.last_insert_rowid(),
                username: new.username,
                score: new.score,
                time_ms: new.time_ms,
                clicks: new.clicks,
                found_objects: new.found_objects,
                target_objects: new.target_objects,
                image_mode: new.image_mode,
                created_at: now,
                questionnaire: new.questionnaire,
            })
        })
        .await
    }

    /// Results ordered most recent first, optionally narrowed by exact
    /// image mode and case-insensitive username substring.
    pub async fn list_results(&self, filter: ResultFilter) -> Result<Vec<StudyResult>> {
        self.execute(move |conn| {
            let mut clauses = Vec::new();
            let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(image_mode) = filter.image_mode {
                clauses.push("image_mode = ?");
                params_vec.push(Box::new(image_mode));
            }
            if let Some(username) = filter.username {
                clauses.push("username LIKE '%' || ? || '%' COLLATE NOCASE");
                params_vec.push(Box::new(username));
            }

            let mut query = format!("SELECT {RESULT_COLUMNS} FROM study_results");
            if !clauses.is_empty() {
                query.push_str(" WHERE ");
                query.push_str(&clauses.join(" AND "));
            }
            query.push_str(" ORDER BY created_at DESC, id DESC");

            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params_vec.iter().map(|b| b.as_ref()).collect();

            let mut stmt = conn.prepare(&query)?;
            let mut rows = stmt.query(params_refs.as_slice())?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_result(row)?);
            }

            Ok(results)
        })
        .await
    }
}
