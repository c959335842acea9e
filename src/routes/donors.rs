use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use minijinja::context;
use serde::Deserialize;
use serde_json::json;

use crate::auth::CurrentSession;
use crate::directory::{DirectoryStore, FilterCriteria, FilterParams};
use crate::render::{self, DonorCard, ViewMode};
use crate::routes::{error_page, with_query};
use crate::AppState;

#[derive(Deserialize, Debug, Default)]
pub struct DonorQuery {
    pub q: Option<String>,
    pub blood_group: Option<String>,
    pub view: Option<String>,
}

impl DonorQuery {
    fn filter_params(&self) -> FilterParams {
        FilterParams {
            q: self.q.clone(),
            blood_group: self.blood_group.clone(),
        }
    }
}

fn page_url(criteria: &FilterCriteria, view: ViewMode) -> String {
    with_query(
        "/donors",
        &[
            ("q", criteria.search.as_str()),
            ("blood_group", criteria.blood_group.map(|g| g.as_str()).unwrap_or("")),
            ("view", view.as_str()),
        ],
    )
}

pub async fn donors_page(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(query): Query<DonorQuery>,
) -> Response {
    let criteria = FilterCriteria::from_params(&query.filter_params());
    let view = ViewMode::parse(query.view.as_deref());
    let current_url = page_url(&criteria, view);

    let mut store = DirectoryStore::new();
    if let Err(e) = store.load(state.backend.as_ref()).await {
        tracing::warn!("Donor directory unavailable: {}", e);
        return error_page(
            &state,
            StatusCode::SERVICE_UNAVAILABLE,
            session.is_signed_in(),
            store.error().unwrap_or("Failed to load donors"),
            Some(&current_url),
        );
    }

    let visible = store.filtered(&criteria);
    let cards = match render::render_donor_cards(&state.templates, &visible, view) {
        Ok(html) => html,
        Err(e) => return render::respond(StatusCode::OK, Err(e)),
    };

    let ctx = context! {
        page => "donors",
        signed_in => session.is_signed_in(),
        total => store.total(),
        shown => visible.len(),
        cards => render::trusted(cards),
        search => &criteria.search,
        selected_group => criteria.blood_group.map(|g| g.as_str()).unwrap_or(""),
        blood_groups => render::blood_group_options(),
        view => view.as_str(),
        grid_url => page_url(&criteria, ViewMode::Grid),
        list_url => page_url(&criteria, ViewMode::List),
        clear_url => with_query("/donors", &[("view", view.as_str())]),
        has_filters => !criteria.is_empty(),
    };
    render::respond(StatusCode::OK, state.templates.render("donors.html", ctx))
}

/// Contact panel for one available donor. Shows the site's contact channel.
pub async fn contact_donor(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
) -> Response {
    let token = session.0.as_ref().map(|u| u.access_token.as_str());
    match state.backend.fetch_donor(&id, token).await {
        Ok(Some(donor)) if donor.is_available => {
            let ctx = context! {
                page => "donors",
                signed_in => session.is_signed_in(),
                donor => DonorCard::from(&donor),
                phone_link => render::CONTACT_PHONE_LINK,
                email_link => format!("mailto:{}", render::CONTACT_EMAIL),
            };
            render::respond(StatusCode::OK, state.templates.render("donor_contact.html", ctx))
        }
        Ok(_) => error_page(
            &state,
            StatusCode::NOT_FOUND,
            session.is_signed_in(),
            "Donor not found",
            None,
        ),
        Err(e) => {
            tracing::error!(donor_id = %id, "Donor fetch failed: {}", e);
            let retry = format!(
                "/donors/{}",
                url::form_urlencoded::byte_serialize(id.as_bytes()).collect::<String>()
            );
            error_page(
                &state,
                StatusCode::SERVICE_UNAVAILABLE,
                session.is_signed_in(),
                &e.user_message(),
                Some(&retry),
            )
        }
    }
}

/// `{"total": active donors, "donors": filtered cards}`.
pub async fn api_donors(
    State(state): State<AppState>,
    Query(query): Query<DonorQuery>,
) -> Response {
    let criteria = FilterCriteria::from_params(&query.filter_params());

    let mut store = DirectoryStore::new();
    if let Err(e) = store.load(state.backend.as_ref()).await {
        let message = store.error().map(str::to_string).unwrap_or_else(|| e.to_string());
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": message })),
        )
            .into_response();
    }

    let donors: Vec<DonorCard> = store
        .filtered(&criteria)
        .into_iter()
        .map(DonorCard::from)
        .collect();
    (
        StatusCode::OK,
        Json(json!({ "total": store.total(), "donors": donors })),
    )
        .into_response()
}
