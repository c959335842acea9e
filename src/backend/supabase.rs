use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{AuthSession, Backend, BackendError, BackendUser, ProfileUpdate, SignUp};
use crate::directory::DonorRecord;

const PROFILES_TABLE: &str = "profiles";

/// Supabase project client: GoTrue under `/auth/v1`, PostgREST under
/// `/rest/v1`.
#[derive(Clone)]
pub struct SupabaseBackend {
    client: Client,
    base_url: Url,
    anon_key: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    user: Option<BackendUser>,
}

impl SupabaseBackend {
    pub fn new(base_url: Url, anon_key: impl Into<String>) -> Result<Self, BackendError> {
        let client = Client::builder()
            .user_agent(concat!("yogdan/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(15))
            .build()?;
        Ok(Self::with_client(client, base_url, anon_key))
    }

    pub fn with_client(client: Client, base_url: Url, anon_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url,
            anon_key: anon_key.into(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::Decode(format!("bad endpoint {}: {}", path, e)))
    }

    fn profiles_url(&self, filters: &[(&str, &str)]) -> Result<Url, BackendError> {
        let mut url = self.endpoint(&format!("rest/v1/{}", PROFILES_TABLE))?;
        url.query_pairs_mut().extend_pairs(filters.iter().copied());
        Ok(url)
    }

    /// Attaches the project key and the caller's token, or the project key
    /// again for anonymous reads.
    fn authorized(&self, req: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(access_token.unwrap_or(&self.anon_key))
    }

    async fn session_from(resp: Response) -> Result<AuthSession, BackendError> {
        let body: TokenResponse = ok_or_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        match (body.access_token, body.user) {
            (Some(access_token), Some(user)) => Ok(AuthSession {
                access_token,
                expires_in: body.expires_in,
                user,
            }),
            (None, _) => Err(BackendError::ConfirmationPending),
            (Some(_), None) => Err(BackendError::Decode("session without user".to_string())),
        }
    }
}

#[async_trait]
impl Backend for SupabaseBackend {
    async fn sign_up(&self, request: SignUp) -> Result<AuthSession, BackendError> {
        let body = json!({
            "email": request.email,
            "password": request.password,
            "data": {
                "name": request.name,
                "phone": request.phone,
                "blood_group": request.blood_group,
                "address": request.address,
            }
        });
        let resp = self
            .authorized(self.client.post(self.endpoint("auth/v1/signup")?), None)
            .json(&body)
            .send()
            .await?;
        Self::session_from(resp).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let resp = self
            .authorized(self.client.post(url), None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::session_from(resp).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let resp = self
            .authorized(
                self.client.post(self.endpoint("auth/v1/logout")?),
                Some(access_token),
            )
            .send()
            .await?;
        ok_or_status(resp).await.map(|_| ())
    }

    async fn current_user(&self, access_token: &str) -> Result<BackendUser, BackendError> {
        let resp = self
            .authorized(
                self.client.get(self.endpoint("auth/v1/user")?),
                Some(access_token),
            )
            .send()
            .await?;
        ok_or_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn list_available_donors(&self) -> Result<Vec<DonorRecord>, BackendError> {
        let url = self.profiles_url(&[
            ("select", "*"),
            ("is_available", "eq.true"),
            ("order", "created_at.desc"),
        ])?;
        let resp = self.authorized(self.client.get(url), None).send().await?;
        ok_or_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn fetch_donor(
        &self,
        id: &str,
        access_token: Option<&str>,
    ) -> Result<Option<DonorRecord>, BackendError> {
        let id_filter = format!("eq.{}", id);
        let url = self.profiles_url(&[("select", "*"), ("id", &id_filter), ("limit", "1")])?;
        let resp = self
            .authorized(self.client.get(url), access_token)
            .send()
            .await?;
        let rows: Vec<DonorRecord> = ok_or_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(rows.into_iter().next())
    }

    async fn update_donor(
        &self,
        id: &str,
        update: &ProfileUpdate,
        access_token: &str,
    ) -> Result<(), BackendError> {
        let id_filter = format!("eq.{}", id);
        let url = self.profiles_url(&[("id", &id_filter)])?;
        let resp = self
            .authorized(self.client.patch(url), Some(access_token))
            .header("Prefer", "return=minimal")
            .json(update)
            .send()
            .await?;
        ok_or_status(resp).await.map(|_| ())
    }
}

async fn ok_or_status(resp: Response) -> Result<Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status,
        message: error_message(&body),
    })
}

/// Pulls the human-readable part out of a GoTrue or PostgREST error body.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return String::new();
    };
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .unwrap_or_default()
        .to_string()
}
