pub mod donors;
pub mod events;
pub mod pages;
pub mod profile;

use axum::{http::StatusCode, response::Response};
use minijinja::context;

use crate::render;
use crate::AppState;

/// Failure page with the message and an optional "Try again" link back to
/// the request that failed.
pub(crate) fn error_page(
    state: &AppState,
    status: StatusCode,
    signed_in: bool,
    message: &str,
    retry: Option<&str>,
) -> Response {
    let ctx = context! {
        page => "error",
        signed_in,
        message,
        retry,
    };
    render::respond(status, state.templates.render("error.html", ctx))
}

/// `application/x-www-form-urlencoded` query string from `pairs`, skipping
/// empty values.
pub(crate) fn query_string(pairs: &[(&str, &str)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs.iter().filter(|(_, v)| !v.is_empty()) {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

pub(crate) fn with_query(path: &str, pairs: &[(&str, &str)]) -> String {
    let query = query_string(pairs);
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}
