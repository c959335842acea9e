use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use minijinja::context;
use serde::Serialize;

use crate::auth::CurrentSession;
use crate::events::{self, Event, EventFilter, EventParams, EventType};
use crate::render;
use crate::AppState;

#[derive(Serialize)]
struct EventCard<'a> {
    #[serde(flatten)]
    event: &'a Event,
    type_label: &'static str,
    share_text: String,
}

#[derive(Serialize)]
struct TypeOption {
    value: &'static str,
    label: &'static str,
}

fn type_options() -> Vec<TypeOption> {
    std::iter::once(TypeOption {
        value: "all",
        label: "All Events",
    })
    .chain(EventType::ALL.into_iter().map(|t| TypeOption {
        value: t.as_str(),
        label: t.label(),
    }))
    .collect()
}

pub async fn events_page(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(params): Query<EventParams>,
) -> Response {
    let filter = EventFilter::from_params(&params);
    let cards: Vec<EventCard> = events::filter_events(events::catalog(), &filter)
        .into_iter()
        .map(|event| EventCard {
            event,
            type_label: event.kind.label(),
            share_text: event.share_text(),
        })
        .collect();

    let ctx = context! {
        page => "events",
        signed_in => session.is_signed_in(),
        events => cards,
        search => filter.search,
        selected_type => filter.kind.map(EventType::as_str).unwrap_or("all"),
        types => type_options(),
    };
    render::respond(StatusCode::OK, state.templates.render("events.html", ctx))
}

pub async fn api_events(Query(params): Query<EventParams>) -> impl IntoResponse {
    let filter = EventFilter::from_params(&params);
    Json(events::filter_events(events::catalog(), &filter))
}
