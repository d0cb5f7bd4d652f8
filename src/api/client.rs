//! HTTP client for the TTS backend
//!
//! A thin blocking client over the three JSON endpoints. Flows are
//! serialized per user action, so there is no need for an async runtime
//! here. Non-success HTTP status is failure regardless of body content; an
//! error message is extracted from the JSON body on a best-effort basis.

use crate::api::types::{
    AssistantRequest, AssistantResponse, PreprocessRequest, PreprocessResponse, SpeakRequest,
    SpeakResponse,
};
use crate::{LitroError, Result};
use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Backend API surface
///
/// A trait so flows can be exercised against an in-memory backend in tests.
pub trait TtsApi: Send {
    /// `POST /preprocess` - pronunciation-friendly rewriting of `text`
    fn preprocess(&self, text: &str) -> Result<PreprocessResponse>;

    /// `POST /speak` - server-side preprocessing plus audio synthesis
    fn speak(&self, text: &str) -> Result<SpeakResponse>;

    /// `POST /litro` - assistant lookup with optional audio
    fn ask(&self, query: &str) -> Result<AssistantResponse>;
}

/// Blocking HTTP implementation of [`TtsApi`]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
}

impl HttpApiClient {
    /// Build a client for the given base URL
    ///
    /// `timeout` of `None` waits indefinitely for each call, matching the
    /// backend contract; a configured timeout is honored when set.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LitroError::Api(format!("Failed to build HTTP client: {}", e)))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().map_err(|e| {
            if e.is_timeout() {
                LitroError::Api(format!("Request to {} timed out", path))
            } else if e.is_connect() {
                LitroError::Api(format!("Server unreachable: {}", e))
            } else {
                LitroError::Api(format!("Request to {} failed: {}", path, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            // Best-effort message extraction; an unparseable body counts
            // as an empty object
            let body: serde_json::Value = response.json().unwrap_or_else(|_| serde_json::json!({}));
            let message = body
                .get("error")
                .or_else(|| body.get("answer"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string());
            return Err(LitroError::Api(message));
        }

        response
            .json()
            .map_err(|e| LitroError::Api(format!("Invalid response from {}: {}", path, e)))
    }
}

impl TtsApi for HttpApiClient {
    fn preprocess(&self, text: &str) -> Result<PreprocessResponse> {
        self.post_json("/preprocess", &PreprocessRequest { text })
    }

    fn speak(&self, text: &str) -> Result<SpeakResponse> {
        self.post_json("/speak", &SpeakRequest { text })
    }

    fn ask(&self, query: &str) -> Result<AssistantResponse> {
        self.post_json("/litro", &AssistantRequest { query })
    }
}
