//! REST client for the upstream Devin agent API.
//!
//! Every call carries the bearer credential and maps a non-success status
//! to an `Err(String)` embedding the status code and response body. Callers
//! at the tool boundary turn these into tool-level error results rather
//! than transport faults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub const DEVIN_API_BASE_URL: &str = "https://api.devin.ai/v1";

/// Wire shape returned by the Devin sessions endpoints.
#[derive(Debug, Deserialize)]
struct DevinSessionResponse {
    session_id: String,
    status_enum: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    structured_output: Option<Map<String, Value>>,
}

/// One Devin session as surfaced to the bridged tools.
#[derive(Debug, Clone, Serialize)]
pub struct DevinSession {
    pub session_id: String,
    pub status: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub structured_output: Option<Map<String, Value>>,
}

impl From<DevinSessionResponse> for DevinSession {
    fn from(response: DevinSessionResponse) -> Self {
        Self {
            session_id: response.session_id,
            status: response.status_enum,
            title: response.title,
            url: response.url,
            structured_output: response.structured_output,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateSessionOptions {
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct DevinClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DevinClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn create_session(
        &self,
        prompt: &str,
        options: CreateSessionOptions,
    ) -> Result<DevinSession, String> {
        let mut body = serde_json::json!({ "prompt": prompt });
        if let Some(title) = options.title {
            body["title"] = Value::String(title);
        }
        if let Some(tags) = options.tags {
            body["tags"] = serde_json::to_value(tags).map_err(|err| err.to_string())?;
        }

        debug!(base_url = %self.base_url, "Creating Devin session");
        let request = self
            .http
            .post(format!("{}/sessions", self.base_url))
            .header("Authorization", self.auth_header())
            .json(&body);
        self.execute(request).await
    }

    pub async fn session_status(&self, session_id: &str) -> Result<DevinSession, String> {
        debug!(session_id = %session_id, "Fetching Devin session status");
        let request = self
            .http
            .get(format!("{}/sessions/{}", self.base_url, session_id))
            .header("Authorization", self.auth_header());
        self.execute(request).await
    }

    pub async fn send_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<DevinSession, String> {
        debug!(session_id = %session_id, "Sending message to Devin session");
        let request = self
            .http
            .post(format!("{}/sessions/{}/messages", self.base_url, session_id))
            .header("Authorization", self.auth_header())
            .json(&serde_json::json!({ "message": message }));
        self.execute(request).await
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<DevinSession, String> {
        let response = request.send().await.map_err(|err| err.to_string())?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("{} {}", status.as_u16(), body));
        }
        let session = response
            .json::<DevinSessionResponse>()
            .await
            .map_err(|err| err.to_string())?;
        Ok(session.into())
    }
}
