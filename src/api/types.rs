//! Wire types for the backend endpoints
//!
//! All three endpoints take and return JSON. Response fields are optional
//! throughout: the server omits them freely, and a missing field is handled
//! by the flow, not treated as a protocol error.

use serde::{Deserialize, Serialize};

/// Body for `POST /preprocess`
#[derive(Debug, Serialize)]
pub struct PreprocessRequest<'a> {
    pub text: &'a str,
}

/// Response from `POST /preprocess`
#[derive(Debug, Clone, Deserialize)]
pub struct PreprocessResponse {
    /// Pronunciation-friendly rewriting of the input
    #[serde(default)]
    pub processed: Option<String>,
}

/// Body for `POST /speak`
#[derive(Debug, Serialize)]
pub struct SpeakRequest<'a> {
    pub text: &'a str,
}

/// Response from `POST /speak`
#[derive(Debug, Clone, Deserialize)]
pub struct SpeakResponse {
    #[serde(default)]
    pub processed: Option<String>,
    /// URL of the rendered audio asset, when synthesis succeeded
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// Body for `POST /litro`
#[derive(Debug, Serialize)]
pub struct AssistantRequest<'a> {
    pub query: &'a str,
}

/// Response from `POST /litro`
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub meta: Option<AssistantMeta>,
}

/// Answer metadata attached by the assistant endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMeta {
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub method: String,
}
