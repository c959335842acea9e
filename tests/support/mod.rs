#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{body::to_bytes, http::header, response::Response};
use chrono::{Duration, TimeZone, Utc};
use reqwest::StatusCode;

use yogdan::auth::SessionUser;
use yogdan::backend::{AuthSession, Backend, BackendError, BackendUser, ProfileUpdate, SignUp};
use yogdan::directory::{BloodGroup, DonorRecord};
use yogdan::AppState;

pub const SECRET: &[u8] = b"test-secret-test-secret-test-secret";

struct Account {
    user: BackendUser,
    password: String,
}

#[derive(Default)]
struct Inner {
    donors: Vec<DonorRecord>,
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    fail_reads: bool,
    fail_sign_out: bool,
    sign_outs: usize,
}

/// In-memory stand-in for the hosted backend.
#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl MemoryBackend {
    pub fn with_donors(donors: Vec<DonorRecord>) -> Self {
        let backend = Self::default();
        backend.inner.lock().unwrap().donors = donors;
        backend
    }

    pub fn set_failing_reads(&self, failing: bool) {
        self.inner.lock().unwrap().fail_reads = failing;
    }

    pub fn set_failing_sign_out(&self, failing: bool) {
        self.inner.lock().unwrap().fail_sign_out = failing;
    }

    pub fn revoke_all_tokens(&self) {
        self.inner.lock().unwrap().tokens.clear();
    }

    pub fn donor(&self, id: &str) -> Option<DonorRecord> {
        self.inner.lock().unwrap().donors.iter().find(|d| d.id == id).cloned()
    }

    pub fn account_count(&self) -> usize {
        self.inner.lock().unwrap().accounts.len()
    }

    pub fn active_tokens(&self) -> usize {
        self.inner.lock().unwrap().tokens.len()
    }

    pub fn sign_outs(&self) -> usize {
        self.inner.lock().unwrap().sign_outs
    }

    /// Registers an account with a profile row and returns a live session.
    pub fn register(
        &self,
        id: &str,
        email: &str,
        password: &str,
        donor: DonorRecord,
    ) -> SessionUser {
        let mut inner = self.inner.lock().unwrap();
        inner.accounts.push(Account {
            user: BackendUser {
                id: id.to_string(),
                email: Some(email.to_string()),
            },
            password: password.to_string(),
        });
        inner.donors.push(donor);
        let token = format!("token-{}", id);
        inner.tokens.insert(token.clone(), id.to_string());
        SessionUser {
            id: id.to_string(),
            email: Some(email.to_string()),
            access_token: token,
        }
    }

    fn issue(inner: &mut Inner, user: BackendUser) -> AuthSession {
        let token = format!("token-{}-{}", user.id, inner.tokens.len());
        inner.tokens.insert(token.clone(), user.id.clone());
        AuthSession {
            access_token: token,
            expires_in: Some(3600),
            user,
        }
    }
}

fn rejected(status: StatusCode, message: &str) -> BackendError {
    BackendError::Status {
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn sign_up(&self, request: SignUp) -> Result<AuthSession, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .accounts
            .iter()
            .any(|a| a.user.email.as_deref() == Some(request.email.as_str()))
        {
            return Err(rejected(StatusCode::UNPROCESSABLE_ENTITY, "User already registered"));
        }
        let id = format!("user-{}", inner.accounts.len() + 1);
        let user = BackendUser {
            id: id.clone(),
            email: Some(request.email.clone()),
        };
        inner.accounts.push(Account {
            user: user.clone(),
            password: request.password,
        });
        inner.donors.push(DonorRecord {
            id,
            name: request.name,
            email: Some(request.email),
            phone: Some(request.phone),
            blood_group: request.blood_group,
            address: request.address,
            is_available: true,
            created_at: Utc::now(),
            updated_at: None,
            last_donation: None,
        });
        Ok(Self::issue(&mut inner, user))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        let user = inner
            .accounts
            .iter()
            .find(|a| a.user.email.as_deref() == Some(email) && a.password == password)
            .map(|a| a.user.clone())
            .ok_or_else(|| rejected(StatusCode::BAD_REQUEST, "Invalid login credentials"))?;
        Ok(Self::issue(&mut inner, user))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        inner.sign_outs += 1;
        if inner.fail_sign_out {
            return Err(rejected(StatusCode::BAD_GATEWAY, ""));
        }
        inner.tokens.remove(access_token);
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> Result<BackendUser, BackendError> {
        let inner = self.inner.lock().unwrap();
        let id = inner
            .tokens
            .get(access_token)
            .ok_or_else(|| rejected(StatusCode::UNAUTHORIZED, "invalid JWT"))?;
        inner
            .accounts
            .iter()
            .find(|a| &a.user.id == id)
            .map(|a| a.user.clone())
            .ok_or_else(|| rejected(StatusCode::UNAUTHORIZED, "User not found"))
    }

    async fn list_available_donors(&self) -> Result<Vec<DonorRecord>, BackendError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(rejected(StatusCode::SERVICE_UNAVAILABLE, ""));
        }
        let mut donors: Vec<DonorRecord> =
            inner.donors.iter().filter(|d| d.is_available).cloned().collect();
        donors.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(donors)
    }

    async fn fetch_donor(
        &self,
        id: &str,
        _access_token: Option<&str>,
    ) -> Result<Option<DonorRecord>, BackendError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(rejected(StatusCode::SERVICE_UNAVAILABLE, ""));
        }
        Ok(inner.donors.iter().find(|d| d.id == id).cloned())
    }

    async fn update_donor(
        &self,
        id: &str,
        update: &ProfileUpdate,
        access_token: &str,
    ) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.tokens.get(access_token).map(String::as_str) != Some(id) {
            return Err(rejected(StatusCode::UNAUTHORIZED, "invalid JWT"));
        }
        let donor = inner
            .donors
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| rejected(StatusCode::NOT_FOUND, "Profile not found"))?;
        if let Some(name) = &update.name {
            donor.name = name.clone();
        }
        if let Some(phone) = &update.phone {
            donor.phone = Some(phone.clone());
        }
        if let Some(group) = update.blood_group {
            donor.blood_group = group;
        }
        if let Some(address) = &update.address {
            donor.address = address.clone();
        }
        donor.updated_at = Some(update.updated_at);
        Ok(())
    }
}

/// A donor who joined `days_ago` days before 2024-06-01.
pub fn donor(id: &str, name: &str, address: &str, group: BloodGroup, days_ago: i64) -> DonorRecord {
    DonorRecord {
        id: id.to_string(),
        name: name.to_string(),
        email: Some(format!("{}@example.com", id)),
        phone: Some("9876543210".to_string()),
        blood_group: group,
        address: address.to_string(),
        is_available: true,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() - Duration::days(days_ago),
        updated_at: None,
        last_donation: None,
    }
}

pub fn app_state(backend: Arc<MemoryBackend>) -> AppState {
    AppState::new(backend, SECRET, false).expect("app state")
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub fn set_cookie(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
}
