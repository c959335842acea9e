use std::convert::Infallible;
use std::future::Future;

use axum::{
    extract::{Form, FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use minijinja::context;
use serde::{Deserialize, Serialize};

use crate::backend::AuthSession;
use crate::error::Error;
use crate::forms::{LoginForm, SignupForm};
use crate::render;
use crate::AppState;

pub const SESSION_COOKIE_NAME: &str = "yogdan_session";

/// Upper bound on how long the cookie mirror outlives its issue time.
const MAX_SESSION_SECS: i64 = 60 * 60 * 24;
/// GoTrue's default access token lifetime.
const DEFAULT_TOKEN_SECS: i64 = 60 * 60;

// The backend access token rides inside a signed JWT so the cookie can't be
// forged or edited client-side.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: Option<String>,
    tok: String,
    iat: i64,
    exp: i64,
}

/// Signed-in user as mirrored in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
    pub access_token: String,
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    secure: bool,
}

impl SessionKeys {
    pub fn new(secret: &[u8], secure: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            secure,
        }
    }

    /// Signs a mirror of `session`. Returns the token and its lifetime in
    /// seconds.
    pub fn issue(&self, session: &AuthSession) -> Result<(String, i64), Error> {
        let lifetime = session
            .expires_in
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TOKEN_SECS)
            .min(MAX_SESSION_SECS);
        let now = Utc::now();
        let claims = Claims {
            sub: session.user.id.clone(),
            email: session.user.email.clone(),
            tok: session.access_token.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(lifetime)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok((token, lifetime))
    }

    pub fn verify(&self, token: &str) -> Result<SessionUser, Error> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(SessionUser {
            id: data.claims.sub,
            email: data.claims.email,
            access_token: data.claims.tok,
        })
    }

    pub fn cookie(&self, token: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            SESSION_COOKIE_NAME, token, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn clear_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
            SESSION_COOKIE_NAME
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Reads the session mirror from request headers. An invalid or expired
    /// cookie reads as signed out.
    pub fn read(&self, headers: &HeaderMap) -> Option<SessionUser> {
        let token = extract_token_from_headers(headers)?;
        match self.verify(&token) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!("Ignoring session cookie: {}", e);
                None
            }
        }
    }
}

pub fn extract_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE).and_then(|h| h.to_str().ok())?;
    cookie_header.split(';').find_map(|cookie| {
        let (k, v) = cookie.trim().split_once('=')?;
        (k == SESSION_COOKIE_NAME && !v.is_empty()).then(|| v.to_string())
    })
}

/// Required session; requests without one are sent to the login page.
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = Response;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let user = state.sessions.read(&parts.headers);
        async move { user.ok_or_else(|| Redirect::to("/login").into_response()) }
    }
}

/// Optional session, for pages that only adjust their chrome.
pub struct CurrentSession(pub Option<SessionUser>);

impl CurrentSession {
    pub fn is_signed_in(&self) -> bool {
        self.0.is_some()
    }
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let user = state.sessions.read(&parts.headers);
        async move { Ok(CurrentSession(user)) }
    }
}

fn establish(state: &AppState, session: &AuthSession) -> Response {
    match state.sessions.issue(session) {
        Ok((token, max_age)) => {
            tracing::info!(user_id = %session.user.id, "session established");
            let cookie = state.sessions.cookie(&token, max_age);
            (
                AppendHeaders([(header::SET_COOKIE, cookie)]),
                Redirect::to("/"),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Session token creation failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Auth failed").into_response()
        }
    }
}

fn signup_page(
    state: &AppState,
    status: StatusCode,
    form: &SignupForm,
    error: Option<String>,
) -> Response {
    let ctx = context! {
        page => "signup",
        signed_in => false,
        form => form,
        error => error,
        blood_groups => render::blood_group_options(),
    };
    render::respond(status, state.templates.render("signup.html", ctx))
}

fn login_page(
    state: &AppState,
    status: StatusCode,
    form: &LoginForm,
    error: Option<String>,
) -> Response {
    let ctx = context! {
        page => "login",
        signed_in => false,
        form => form,
        error => error,
    };
    render::respond(status, state.templates.render("login.html", ctx))
}

pub async fn signup_form(State(state): State<AppState>, session: CurrentSession) -> Response {
    if session.is_signed_in() {
        return Redirect::to("/profile").into_response();
    }
    signup_page(&state, StatusCode::OK, &SignupForm::default(), None)
}

pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Response {
    let request = match form.validate() {
        Ok(r) => r,
        Err(e) => {
            return signup_page(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                &form,
                Some(e.to_string()),
            )
        }
    };

    match state.backend.sign_up(request).await {
        Ok(session) => establish(&state, &session),
        Err(e) => {
            tracing::warn!("Signup rejected: {}", e);
            let err = Error::from_auth(e, "An error occurred during signup");
            signup_page(&state, StatusCode::BAD_REQUEST, &form, Some(err.to_string()))
        }
    }
}

pub async fn login_form(State(state): State<AppState>, session: CurrentSession) -> Response {
    if session.is_signed_in() {
        return Redirect::to("/profile").into_response();
    }
    login_page(&state, StatusCode::OK, &LoginForm::default(), None)
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if let Err(e) = form.validate() {
        return login_page(&state, StatusCode::UNPROCESSABLE_ENTITY, &form, Some(e.to_string()));
    }

    match state.backend.sign_in(form.email.trim(), &form.password).await {
        Ok(session) => establish(&state, &session),
        Err(e) => {
            tracing::warn!("Sign-in rejected: {}", e);
            let err = Error::from_auth(e, "Invalid email or password");
            login_page(&state, StatusCode::UNAUTHORIZED, &form, Some(err.to_string()))
        }
    }
}

/// Ends the backend session and clears the local mirror. The cookie is
/// cleared even when the backend call fails.
pub async fn logout(State(state): State<AppState>, session: CurrentSession) -> Response {
    if let Some(user) = session.0 {
        if let Err(e) = state.backend.sign_out(&user.access_token).await {
            tracing::warn!(user_id = %user.id, "Backend sign-out failed: {}", e);
        }
    }
    end_session(&state, "/")
}

/// Clears the session mirror and redirects.
pub fn end_session(state: &AppState, to: &str) -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, state.sessions.clear_cookie())]),
        Redirect::to(to),
    )
        .into_response()
}
