//! Seam to the hosted backend that owns accounts and donor profiles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::directory::{BloodGroup, DonorRecord};

pub mod supabase;

pub use supabase::SupabaseBackend;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend responded {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("unexpected backend response: {0}")]
    Decode(String),

    /// Account created but the backend wants the email confirmed before
    /// it issues a session.
    #[error("email confirmation pending")]
    ConfirmationPending,
}

impl BackendError {
    /// Text safe to show on a page.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Http(_) => "Could not reach the donor service".to_string(),
            BackendError::Status { message, .. } if !message.is_empty() => message.clone(),
            BackendError::Status { status, .. } => format!("Donor service error ({})", status),
            BackendError::Decode(_) => "The donor service sent an unexpected response".to_string(),
            BackendError::ConfirmationPending => {
                "Check your inbox to confirm your email address, then sign in.".to_string()
            }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            BackendError::Status { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }
}

/// Account creation request; profile fields ride along as user metadata.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
    pub blood_group: BloodGroup,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub user: BackendUser,
}

/// Per-field partial update of a profile row. `None` fields are left out
/// of the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<BloodGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn sign_up(&self, request: SignUp) -> Result<AuthSession, BackendError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;

    async fn current_user(&self, access_token: &str) -> Result<BackendUser, BackendError>;

    /// Available donors ordered by creation time, newest first.
    async fn list_available_donors(&self) -> Result<Vec<DonorRecord>, BackendError>;

    async fn fetch_donor(
        &self,
        id: &str,
        access_token: Option<&str>,
    ) -> Result<Option<DonorRecord>, BackendError>;

    async fn update_donor(
        &self,
        id: &str,
        update: &ProfileUpdate,
        access_token: &str,
    ) -> Result<(), BackendError>;
}
