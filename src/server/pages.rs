use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use warp::http::Uri;
use warp::reply::{Reply, Response};
use warp::Rejection;

use crate::db::Database;
use crate::server::auth::verify_password;
use crate::server::error::{reject, ApiError};
use crate::server::session::{with_session_cookie, SessionStore};
use crate::settings::Settings;

const INDEX_HTML: &str = include_str!("assets/index.html");
const STUDY_HTML: &str = include_str!("assets/study.html");
const ADMIN_HTML: &str = include_str!("assets/admin.html");
const ADMIN_LOGIN_HTML: &str = include_str!("assets/admin_login.html");

fn html_with_cookie(body: String, sid: &str) -> Response {
    with_session_cookie(warp::reply::html(body), sid)
}

fn redirect_with_cookie(location: Uri, sid: &str) -> Response {
    with_session_cookie(warp::redirect::see_other(location), sid)
}

pub async fn landing(sid: String, sessions: SessionStore) -> Result<Response, Rejection> {
    let session = sessions.get(&sid);
    let flash = sessions.take_flash(&sid).unwrap_or_default();

    let body = INDEX_HTML
        .replace("__FLASH__", &flash)
        .replace(
            "__TEST_COMPLETED__",
            if session.test_completed { "true" } else { "false" },
        );
    Ok(html_with_cookie(body, &sid))
}

/// Consent gate: only an explicit checkbox submission moves the participant
/// into the study.
pub async fn proceed(
    form: HashMap<String, String>,
    sid: String,
    sessions: SessionStore,
) -> Result<Response, Rejection> {
    if form.get("consent").map(String::as_str) == Some("on") {
        Ok(redirect_with_cookie(Uri::from_static("/study"), &sid))
    } else {
        sessions.set_flash(&sid, "You must provide consent to participate in the study.");
        Ok(redirect_with_cookie(Uri::from_static("/"), &sid))
    }
}

pub async fn study(db: Database) -> Result<Response, Rejection> {
    let coordinates = db
        .list_coordinates()
        .await
        .map_err(|err| reject(ApiError::Storage(err)))?;
    let coordinates_json =
        serde_json::to_string(&coordinates).unwrap_or_else(|_| "[]".to_string());

    let body = STUDY_HTML.replace("__STORED_COORDINATES__", &coordinates_json);
    Ok(warp::reply::html(body).into_response())
}

pub async fn admin(
    sid: String,
    sessions: SessionStore,
    db: Database,
) -> Result<Response, Rejection> {
    if !sessions.is_admin(&sid) {
        return Ok(redirect_with_cookie(Uri::from_static("/admin/login"), &sid));
    }

    let coordinates = db
        .list_coordinates()
        .await
        .map_err(|err| reject(ApiError::Storage(err)))?;
    let coordinates_json =
        serde_json::to_string(&coordinates).unwrap_or_else(|_| "[]".to_string());

    let body = ADMIN_HTML.replace("__STORED_COORDINATES__", &coordinates_json);
    Ok(html_with_cookie(body, &sid))
}

pub async fn admin_login_form(
    sid: String,
    sessions: SessionStore,
) -> Result<Response, Rejection> {
    let flash = sessions.take_flash(&sid).unwrap_or_default();
    let body = ADMIN_LOGIN_HTML.replace("__FLASH__", &flash);
    Ok(html_with_cookie(body, &sid))
}

pub async fn admin_login_submit(
    form: HashMap<String, String>,
    sid: String,
    sessions: SessionStore,
    settings: Arc<Settings>,
) -> Result<Response, Rejection> {
    let password = form.get("password").map(String::as_str).unwrap_or_default();

    if verify_password(password, &settings.admin_password_sha256) {
        sessions.set_admin(&sid, true);
        info!("Admin session authenticated");
        Ok(redirect_with_cookie(Uri::from_static("/admin"), &sid))
    } else {
        let body = ADMIN_LOGIN_HTML.replace("__FLASH__", "Invalid password. Please try again.");
        Ok(html_with_cookie(body, &sid))
    }
}

pub async fn admin_logout(sid: String, sessions: SessionStore) -> Result<Response, Rejection> {
    sessions.set_admin(&sid, false);
    sessions.set_flash(&sid, "You have been logged out.");
    Ok(redirect_with_cookie(Uri::from_static("/admin/login"), &sid))
}
