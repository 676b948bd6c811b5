use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use log::info;
use warp::{Filter, Reply};

use crate::db::models::StoredCoordinate;
use crate::db::Database;
use crate::settings::Settings;

pub mod api;
pub mod auth;
pub mod error;
pub mod pages;
pub mod session;

use session::SessionStore;

/// Shared handles cloned into every route.
#[derive(Clone)]
pub struct ServerContext {
    pub db: Database,
    pub sessions: SessionStore,
    pub settings: Arc<Settings>,
}

fn with_db(db: Database) -> impl Filter<Extract = (Database,), Error = Infallible> + Clone {
    warp::any().map(move || db.clone())
}

fn with_sessions(
    sessions: SessionStore,
) -> impl Filter<Extract = (SessionStore,), Error = Infallible> + Clone {
    warp::any().map(move || sessions.clone())
}

fn with_settings(
    settings: Arc<Settings>,
) -> impl Filter<Extract = (Arc<Settings>,), Error = Infallible> + Clone {
    warp::any().map(move || settings.clone())
}

/// Resolves the request's session id from the `sid` cookie, creating a new
/// session when the cookie is absent or stale.
fn with_sid(
    sessions: SessionStore,
) -> impl Filter<Extract = (String,), Error = Infallible> + Clone {
    warp::cookie::optional::<String>("sid").map(move |cookie| sessions.resolve(cookie))
}

pub fn routes(
    ctx: &ServerContext,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let db = ctx.db.clone();
    let sessions = ctx.sessions.clone();
    let settings = ctx.settings.clone();

    let landing = warp::path::end()
        .and(warp::get())
        .and(with_sid(sessions.clone()))
        .and(with_sessions(sessions.clone()))
        .and_then(pages::landing);

    let proceed = warp::path!("proceed")
        .and(warp::post())
        .and(warp::body::form::<HashMap<String, String>>())
        .and(with_sid(sessions.clone()))
        .and(with_sessions(sessions.clone()))
        .and_then(pages::proceed);

    let study = warp::path!("study")
        .and(warp::get())
        .and(with_db(db.clone()))
        .and_then(pages::study);

    let admin_login_form = warp::path!("admin" / "login")
        .and(warp::get())
        .and(with_sid(sessions.clone()))
        .and(with_sessions(sessions.clone()))
        .and_then(pages::admin_login_form);

    let admin_login_submit = warp::path!("admin" / "login")
        .and(warp::post())
        .and(warp::body::form::<HashMap<String, String>>())
        .and(with_sid(sessions.clone()))
        .and(with_sessions(sessions.clone()))
        .and(with_settings(settings.clone()))
        .and_then(pages::admin_login_submit);

    let admin_logout = warp::path!("admin" / "logout")
        .and(warp::get())
        .and(with_sid(sessions.clone()))
        .and(with_sessions(sessions.clone()))
        .and_then(pages::admin_logout);

    let admin_page = warp::path!("admin")
        .and(warp::get())
        .and(with_sid(sessions.clone()))
        .and(with_sessions(sessions.clone()))
        .and(with_db(db.clone()))
        .and_then(pages::admin);

    let coordinates = warp::path!("api" / "coordinates");
    let coordinates_list = coordinates
        .and(warp::get())
        .and(with_db(db.clone()))
        .and_then(api::list_coordinates);
    let coordinates_create = coordinates
        .and(warp::post())
        .and(warp::body::json::<api::CreateCoordinatePayload>())
        .and(with_db(db.clone()))
        .and_then(api::create_coordinate);
    let coordinates_replace = coordinates
        .and(warp::put())
        .and(warp::body::json::<Vec<StoredCoordinate>>())
        .and(with_db(db.clone()))
        .and_then(api::replace_coordinates);
    let coordinates_delete = coordinates
        .and(warp::delete())
        .and(warp::query::<api::DeleteCoordinatesQuery>())
        .and(with_db(db.clone()))
        .and_then(api::delete_coordinates);

    let polygon_sets = warp::path!("api" / "polygon-sets");
    let polygon_sets_list = polygon_sets
        .and(warp::get())
        .and(with_db(db.clone()))
        .and_then(api::list_polygon_sets);
    let polygon_sets_snapshot = polygon_sets
        .and(warp::post())
        .and(warp::body::json::<api::SnapshotPolygonSetPayload>())
        .and(with_db(db.clone()))
        .and_then(api::snapshot_polygon_set);
    let polygon_sets_load = polygon_sets
        .and(warp::put())
        .and(warp::body::json::<api::LoadPolygonSetPayload>())
        .and(with_db(db.clone()))
        .and_then(api::load_polygon_set);
    let polygon_sets_delete = polygon_sets
        .and(warp::delete())
        .and(warp::query::<api::DeletePolygonSetQuery>())
        .and(with_db(db.clone()))
        .and_then(api::delete_polygon_set);

    let generate_image = warp::path!("api" / "generate-image")
        .and(warp::get())
        .and(warp::query::<api::GenerateImageQuery>())
        .and(with_settings(settings))
        .and_then(api::generate_image);

    let submit_score = warp::path!("api" / "submit-score")
        .and(warp::post())
        .and(warp::body::json::<api::SubmitScorePayload>())
        .and(with_sid(sessions.clone()))
        .and(with_sessions(sessions.clone()))
        .and(with_db(db.clone()))
        .and_then(api::submit_score);

    let export_data = warp::path!("api" / "export-data")
        .and(warp::get())
        .and(with_db(db.clone()))
        .and_then(api::export_data);

    let admin_results = warp::path!("api" / "admin" / "results")
        .and(warp::get())
        .and(warp::query::<api::ResultsQuery>())
        .and(with_sid(sessions.clone()))
        .and(with_sessions(sessions))
        .and(with_db(db))
        .and_then(api::admin_results);

    landing
        .or(proceed)
        .or(study)
        .or(admin_login_form)
        .or(admin_login_submit)
        .or(admin_logout)
        .or(admin_page)
        .or(coordinates_list)
        .or(coordinates_create)
        .or(coordinates_replace)
        .or(coordinates_delete)
        .or(polygon_sets_list)
        .or(polygon_sets_snapshot)
        .or(polygon_sets_load)
        .or(polygon_sets_delete)
        .or(generate_image)
        .or(submit_score)
        .or(export_data)
        .or(admin_results)
        .recover(error::handle_rejection)
}

pub async fn serve(ctx: ServerContext) {
    let addr = ctx.settings.bind_addr;
    info!("Listening on http://{addr}");
    warp::serve(routes(&ctx)).run(addr).await;
}
