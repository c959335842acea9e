use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use minijinja::context;
use serde::{Deserialize, Serialize};

use crate::auth::{end_session, SessionUser};
use crate::directory::DonorRecord;
use crate::forms::{CertificateForm, ProfileForm};
use crate::profile::{ProfileStats, ProfileTab};
use crate::render::{self, DonorCard};
use crate::routes::error_page;
use crate::AppState;

#[derive(Deserialize, Debug, Default)]
pub struct ProfileQuery {
    pub tab: Option<String>,
}

#[derive(Serialize)]
struct TabLink {
    id: &'static str,
    label: &'static str,
    active: bool,
}

/// What the page shows beyond the stored record.
#[derive(Default)]
struct ProfileView {
    form: Option<ProfileForm>,
    certificate_form: Option<CertificateForm>,
    notice: Option<&'static str>,
    error: Option<String>,
}

/// Confirms the session with the backend and fetches the user's own row.
/// A rejected token clears the cookie and sends the user to sign in again.
async fn load_own_record(state: &AppState, user: &SessionUser) -> Result<DonorRecord, Response> {
    match state.backend.current_user(&user.access_token).await {
        Ok(current) if current.id == user.id => {}
        Ok(current) => {
            tracing::warn!(
                cookie_user = %user.id,
                backend_user = %current.id,
                "Session user mismatch"
            );
            return Err(end_session(state, "/login"));
        }
        Err(e) if e.is_unauthorized() => {
            tracing::info!(user_id = %user.id, "Backend session expired");
            return Err(end_session(state, "/login"));
        }
        Err(e) => {
            tracing::error!("Session check failed: {}", e);
            return Err(error_page(
                state,
                StatusCode::SERVICE_UNAVAILABLE,
                true,
                &e.user_message(),
                Some("/profile"),
            ));
        }
    }

    match state
        .backend
        .fetch_donor(&user.id, Some(&user.access_token))
        .await
    {
        Ok(Some(record)) => Ok(record),
        Ok(None) => {
            tracing::warn!(user_id = %user.id, "Signed-in user has no profile row");
            Err(error_page(
                state,
                StatusCode::NOT_FOUND,
                true,
                "Failed to load profile",
                Some("/profile"),
            ))
        }
        Err(e) => {
            tracing::error!(user_id = %user.id, "Profile fetch failed: {}", e);
            Err(error_page(
                state,
                StatusCode::SERVICE_UNAVAILABLE,
                true,
                &e.user_message(),
                Some("/profile"),
            ))
        }
    }
}

async fn render_profile(
    state: &AppState,
    status: StatusCode,
    user: &SessionUser,
    record: &DonorRecord,
    tab: ProfileTab,
    view: ProfileView,
) -> Response {
    let certificates = state.certificates.list(&user.id).await;
    let stats = ProfileStats::new(record.created_at, certificates.len());
    let tabs: Vec<TabLink> = ProfileTab::ALL
        .into_iter()
        .map(|t| TabLink {
            id: t.as_str(),
            label: t.label(),
            active: t == tab,
        })
        .collect();

    let ctx = context! {
        page => "profile",
        signed_in => true,
        email => record.email.as_deref().or(user.email.as_deref()),
        card => DonorCard::from(record),
        form => view.form.unwrap_or_else(|| ProfileForm::from_record(record)),
        certificate_form => view.certificate_form.unwrap_or_default(),
        blood_groups => render::blood_group_options(),
        tab => tab.as_str(),
        tabs,
        certificates,
        stats,
        notice => view.notice,
        error => view.error,
    };
    render::respond(status, state.templates.render("profile.html", ctx))
}

pub async fn show_profile(
    State(state): State<AppState>,
    user: SessionUser,
    Query(query): Query<ProfileQuery>,
) -> Response {
    let record = match load_own_record(&state, &user).await {
        Ok(r) => r,
        Err(response) => return response,
    };
    let tab = ProfileTab::parse(query.tab.as_deref());
    render_profile(&state, StatusCode::OK, &user, &record, tab, ProfileView::default()).await
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: SessionUser,
    Form(form): Form<ProfileForm>,
) -> Response {
    let record = match load_own_record(&state, &user).await {
        Ok(r) => r,
        Err(response) => return response,
    };

    let update = match form.to_update(&record, Utc::now()) {
        Ok(u) => u,
        Err(e) => {
            let view = ProfileView {
                error: Some(e.to_string()),
                form: Some(form),
                ..Default::default()
            };
            return render_profile(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                &user,
                &record,
                ProfileTab::Personal,
                view,
            )
            .await;
        }
    };

    if let Err(e) = state
        .backend
        .update_donor(&user.id, &update, &user.access_token)
        .await
    {
        if e.is_unauthorized() {
            return end_session(&state, "/login");
        }
        tracing::error!(user_id = %user.id, "Profile update failed: {}", e);
        let view = ProfileView {
            error: Some(e.user_message()),
            form: Some(form),
            ..Default::default()
        };
        return render_profile(
            &state,
            StatusCode::SERVICE_UNAVAILABLE,
            &user,
            &record,
            ProfileTab::Personal,
            view,
        )
        .await;
    }
    tracing::info!(user_id = %user.id, "profile updated");

    let record = match load_own_record(&state, &user).await {
        Ok(r) => r,
        Err(response) => return response,
    };
    let view = ProfileView {
        notice: Some("Profile updated successfully!"),
        ..Default::default()
    };
    render_profile(&state, StatusCode::OK, &user, &record, ProfileTab::Personal, view).await
}

pub async fn add_certificate(
    State(state): State<AppState>,
    user: SessionUser,
    Form(form): Form<CertificateForm>,
) -> Response {
    let added = match form.validate() {
        Ok(new) => state.certificates.add(&user.id, new).await,
        Err(e) => Err(e),
    };
    match added {
        Ok(certificate) => {
            tracing::info!(
                user_id = %user.id,
                certificate_id = %certificate.id,
                "certificate added"
            );
            Redirect::to("/profile?tab=certificates").into_response()
        }
        Err(e) => {
            let record = match load_own_record(&state, &user).await {
                Ok(r) => r,
                Err(response) => return response,
            };
            let view = ProfileView {
                error: Some(e.to_string()),
                certificate_form: Some(form),
                ..Default::default()
            };
            render_profile(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                &user,
                &record,
                ProfileTab::Certificates,
                view,
            )
            .await
        }
    }
}

pub async fn delete_certificate(
    State(state): State<AppState>,
    user: SessionUser,
    Path(id): Path<String>,
) -> Response {
    if !state.certificates.remove(&user.id, &id).await {
        tracing::warn!(
            user_id = %user.id,
            certificate_id = %id,
            "Certificate not found for delete"
        );
    }
    Redirect::to("/profile?tab=certificates").into_response()
}
