//! Profile page state: tabs, donation certificates and quick stats.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::forms::NewCertificate;

/// Rough estimate of patients helped per donation. Display only.
pub const LIVES_PER_DONATION: usize = 3;

pub const MAX_CERTIFICATES_PER_USER: usize = 50;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProfileTab {
    #[default]
    Personal,
    Medical,
    Certificates,
    Settings,
}

impl ProfileTab {
    pub const ALL: [ProfileTab; 4] = [
        ProfileTab::Personal,
        ProfileTab::Medical,
        ProfileTab::Certificates,
        ProfileTab::Settings,
    ];

    /// Unknown or missing values open the personal tab.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("medical") => ProfileTab::Medical,
            Some("certificates") => ProfileTab::Certificates,
            Some("settings") => ProfileTab::Settings,
            _ => ProfileTab::Personal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProfileTab::Personal => "personal",
            ProfileTab::Medical => "medical",
            ProfileTab::Certificates => "certificates",
            ProfileTab::Settings => "settings",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProfileTab::Personal => "Personal Info",
            ProfileTab::Medical => "Medical Info",
            ProfileTab::Certificates => "Certificates",
            ProfileTab::Settings => "Settings",
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Certificate {
    pub id: String,
    pub title: String,
    pub issued_by: String,
    pub date: NaiveDate,
    pub image_url: String,
}

impl From<NewCertificate> for Certificate {
    fn from(new: NewCertificate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            issued_by: new.issued_by,
            date: new.date,
            image_url: new.image_url.to_string(),
        }
    }
}

/// Certificates per user, held in process memory only.
#[derive(Clone, Default)]
pub struct CertificateBook {
    inner: Arc<RwLock<HashMap<String, Vec<Certificate>>>>,
}

impl CertificateBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails once the user already holds `MAX_CERTIFICATES_PER_USER`.
    pub async fn add(&self, user_id: &str, new: NewCertificate) -> Result<Certificate> {
        let mut book = self.inner.write().await;
        let certificates = book.entry(user_id.to_string()).or_default();
        if certificates.len() >= MAX_CERTIFICATES_PER_USER {
            return Err(Error::validation(
                "certificates",
                format!(
                    "You can keep at most {} certificates. Remove one to add another.",
                    MAX_CERTIFICATES_PER_USER
                ),
            ));
        }
        let certificate = Certificate::from(new);
        certificates.push(certificate.clone());
        Ok(certificate)
    }

    /// Certificates in the order they were added.
    pub async fn list(&self, user_id: &str) -> Vec<Certificate> {
        let book = self.inner.read().await;
        book.get(user_id).cloned().unwrap_or_default()
    }

    /// Returns whether a certificate was removed.
    pub async fn remove(&self, user_id: &str, certificate_id: &str) -> bool {
        let mut book = self.inner.write().await;
        let Some(certificates) = book.get_mut(user_id) else {
            return false;
        };
        let before = certificates.len();
        certificates.retain(|c| c.id != certificate_id);
        let removed = certificates.len() != before;
        if certificates.is_empty() {
            book.remove(user_id);
        }
        removed
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileStats {
    pub joined: String,
    pub total_donations: usize,
    pub lives_saved: usize,
}

impl ProfileStats {
    pub fn new(joined: DateTime<Utc>, certificates: usize) -> Self {
        Self {
            joined: joined.format("%d %b %Y").to_string(),
            total_donations: certificates,
            lives_saved: certificates * LIVES_PER_DONATION,
        }
    }
}
