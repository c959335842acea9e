use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use minijinja::context;

use crate::auth::CurrentSession;
use crate::locations::{self, MAP_CENTER, MAP_ZOOM};
use crate::render::{self, CONTACT_EMAIL, CONTACT_PHONE};
use crate::AppState;

pub async fn home(State(state): State<AppState>, session: CurrentSession) -> Response {
    let ctx = context! {
        page => "home",
        signed_in => session.is_signed_in(),
        locations => locations::markers(),
        map_center => [MAP_CENTER.0, MAP_CENTER.1],
        map_zoom => MAP_ZOOM,
        contact_phone => CONTACT_PHONE,
        contact_email => CONTACT_EMAIL,
    };
    render::respond(StatusCode::OK, state.templates.render("home.html", ctx))
}

pub async fn about(State(state): State<AppState>, session: CurrentSession) -> Response {
    let ctx = context! {
        page => "about",
        signed_in => session.is_signed_in(),
    };
    render::respond(StatusCode::OK, state.templates.render("about.html", ctx))
}

pub async fn not_found(State(state): State<AppState>, session: CurrentSession) -> Response {
    let ctx = context! {
        page => "not_found",
        signed_in => session.is_signed_in(),
    };
    render::respond(StatusCode::NOT_FOUND, state.templates.render("not_found.html", ctx))
}

pub async fn api_locations() -> impl IntoResponse {
    Json(locations::markers())
}

pub async fn health_check() -> &'static str {
    "OK"
}
