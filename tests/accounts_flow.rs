mod support;

use std::sync::Arc;

use axum::{
    extract::{Form, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
};

use support::{body_text, donor, location, set_cookie, MemoryBackend};
use yogdan::auth::{self, CurrentSession, SESSION_COOKIE_NAME};
use yogdan::directory::BloodGroup;
use yogdan::forms::{CertificateForm, LoginForm, ProfileForm, SignupForm};
use yogdan::routes::profile::{self, ProfileQuery};

fn signup_form() -> SignupForm {
    SignupForm {
        name: "Priya Mohanty".to_string(),
        phone: "9123456789".to_string(),
        email: "priya@example.com".to_string(),
        password: "donate-blood".to_string(),
        blood_group: "AB-".to_string(),
        address: "Cuttack".to_string(),
    }
}

/// Replays a `Set-Cookie` value as a request `Cookie` header.
fn cookie_headers(set_cookie: &str) -> HeaderMap {
    let pair = set_cookie.split(';').next().unwrap_or_default();
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_str(pair).unwrap());
    headers
}

fn tab(name: &str) -> Query<ProfileQuery> {
    Query(ProfileQuery {
        tab: Some(name.to_string()),
    })
}

#[tokio::test]
async fn signup_validation_failure_submits_nothing() {
    let backend = Arc::new(MemoryBackend::default());
    let state = support::app_state(backend.clone());

    let mut form = signup_form();
    form.phone = "12345".to_string();
    let response = auth::signup(State(state), Form(form)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(set_cookie(&response).is_none());
    let html = body_text(response).await;
    assert!(html.contains("Please enter a valid 10-digit phone number"));
    assert!(html.contains("Priya Mohanty"), "entered values are kept");
    assert!(!html.contains("donate-blood"), "password is never echoed");
    assert_eq!(backend.account_count(), 0);
}

#[tokio::test]
async fn signup_establishes_a_session() {
    let backend = Arc::new(MemoryBackend::default());
    let state = support::app_state(backend.clone());

    let response = auth::signup(State(state.clone()), Form(signup_form())).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let cookie = set_cookie(&response).expect("session cookie").to_string();
    assert!(cookie.starts_with(&format!("{}=", SESSION_COOKIE_NAME)));
    assert!(cookie.contains("HttpOnly"));

    let user = state.sessions.read(&cookie_headers(&cookie)).expect("readable session");
    assert_eq!(user.email.as_deref(), Some("priya@example.com"));

    let record = backend.donor(&user.id).expect("profile row created");
    assert_eq!(record.blood_group, BloodGroup::AbNegative);
    assert_eq!(record.phone.as_deref(), Some("9123456789"));
}

#[tokio::test]
async fn duplicate_signup_shows_backend_message() {
    let backend = Arc::new(MemoryBackend::default());
    let state = support::app_state(backend.clone());

    auth::signup(State(state.clone()), Form(signup_form())).await;
    let response = auth::signup(State(state), Form(signup_form())).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("User already registered"));
    assert_eq!(backend.account_count(), 1);
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_accepts_good_ones() {
    let backend = Arc::new(MemoryBackend::default());
    let state = support::app_state(backend.clone());
    auth::signup(State(state.clone()), Form(signup_form())).await;

    let wrong = LoginForm {
        email: "priya@example.com".to_string(),
        password: "not-my-password".to_string(),
    };
    let response = auth::login(State(state.clone()), Form(wrong)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).is_none());
    assert!(body_text(response).await.contains("Invalid login credentials"));

    let missing = LoginForm {
        email: "priya@example.com".to_string(),
        password: String::new(),
    };
    let response = auth::login(State(state.clone()), Form(missing)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let right = LoginForm {
        email: "priya@example.com".to_string(),
        password: "donate-blood".to_string(),
    };
    let response = auth::login(State(state.clone()), Form(right)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = set_cookie(&response).expect("session cookie");
    assert!(state.sessions.read(&cookie_headers(cookie)).is_some());
}

#[tokio::test]
async fn logout_clears_cookie_even_when_backend_fails() {
    let backend = Arc::new(MemoryBackend::default());
    let user = backend.register(
        "u1",
        "asha@example.com",
        "password1",
        donor("u1", "Asha Das", "Cuttack", BloodGroup::OPositive, 30),
    );
    let state = support::app_state(backend.clone());

    backend.set_failing_sign_out(true);
    let response = auth::logout(State(state.clone()), CurrentSession(Some(user.clone()))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(set_cookie(&response).unwrap().contains("Max-Age=0"));
    assert_eq!(backend.sign_outs(), 1);

    backend.set_failing_sign_out(false);
    let response = auth::logout(State(state), CurrentSession(Some(user))).await;
    assert!(set_cookie(&response).unwrap().contains("Max-Age=0"));
    assert_eq!(backend.active_tokens(), 0);
}

#[tokio::test]
async fn profile_shows_record_and_stats() {
    let backend = Arc::new(MemoryBackend::default());
    let user = backend.register(
        "u1",
        "asha@example.com",
        "password1",
        donor("u1", "Asha Das", "Cuttack", BloodGroup::OPositive, 30),
    );
    let state = support::app_state(backend);

    let response = profile::show_profile(State(state), user, tab("personal")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Asha Das"));
    assert!(html.contains("02 May 2024"));
    assert!(html.contains(r#"<dd class="total-donations">0</dd>"#));
    assert!(html.contains(r#"<dd class="lives-saved">0</dd>"#));
    assert!(html.contains(r#"name="phone""#));
}

#[tokio::test]
async fn revoked_backend_session_signs_out() {
    let backend = Arc::new(MemoryBackend::default());
    let user = backend.register(
        "u1",
        "asha@example.com",
        "password1",
        donor("u1", "Asha Das", "Cuttack", BloodGroup::OPositive, 30),
    );
    let state = support::app_state(backend.clone());
    backend.revoke_all_tokens();

    let response = profile::show_profile(State(state), user, tab("personal")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
    assert!(set_cookie(&response).unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn profile_update_sends_changes() {
    let backend = Arc::new(MemoryBackend::default());
    let user = backend.register(
        "u1",
        "asha@example.com",
        "password1",
        donor("u1", "Asha Das", "Cuttack", BloodGroup::OPositive, 30),
    );
    let state = support::app_state(backend.clone());

    let form = ProfileForm {
        name: "Asha Das".to_string(),
        phone: "9000000001".to_string(),
        blood_group: "O+".to_string(),
        address: "Puri".to_string(),
    };
    let response = profile::update_profile(State(state.clone()), user.clone(), Form(form)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Profile updated successfully!"));

    let record = backend.donor("u1").unwrap();
    assert_eq!(record.address, "Puri");
    assert_eq!(record.phone.as_deref(), Some("9000000001"));
    assert!(record.updated_at.is_some());

    let bad = ProfileForm {
        name: "Asha Das".to_string(),
        phone: "90000".to_string(),
        blood_group: "O+".to_string(),
        address: "Balasore".to_string(),
    };
    let response = profile::update_profile(State(state), user, Form(bad)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Please enter a valid 10-digit phone number"));
    assert_eq!(backend.donor("u1").unwrap().address, "Puri");
}

#[tokio::test]
async fn certificates_drive_the_stats() {
    let backend = Arc::new(MemoryBackend::default());
    let user = backend.register(
        "u1",
        "asha@example.com",
        "password1",
        donor("u1", "Asha Das", "Cuttack", BloodGroup::OPositive, 30),
    );
    let state = support::app_state(backend);

    let form = CertificateForm {
        title: "Blood Donation Certificate".to_string(),
        issued_by: "Red Cross Society".to_string(),
        date: "2024-02-15".to_string(),
        image_url: "https://example.com/certificate.jpg".to_string(),
    };
    let response = profile::add_certificate(State(state.clone()), user.clone(), Form(form)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response =
        profile::show_profile(State(state.clone()), user.clone(), tab("certificates")).await;
    let html = body_text(response).await;
    assert!(html.contains("Blood Donation Certificate"));
    assert!(html.contains("Issued by: Red Cross Society"));
    assert!(html.contains(r#"<dd class="total-donations">1</dd>"#));
    assert!(html.contains(r#"<dd class="lives-saved">3</dd>"#));

    let invalid = CertificateForm {
        title: "Second".to_string(),
        issued_by: "Red Cross Society".to_string(),
        date: "2024-02-15".to_string(),
        image_url: "not a url".to_string(),
    };
    let response =
        profile::add_certificate(State(state.clone()), user.clone(), Form(invalid)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let id = state.certificates.list(&user.id).await[0].id.clone();
    let response = profile::delete_certificate(State(state.clone()), user.clone(), Path(id)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = profile::show_profile(State(state), user, tab("certificates")).await;
    let html = body_text(response).await;
    assert!(html.contains("No certificates added yet."));
    assert!(html.contains(r#"<dd class="lives-saved">0</dd>"#));
}
