//! Backend HTTP API

pub mod client;
pub mod types;

pub use client::{HttpApiClient, TtsApi};
pub use types::{
    AssistantMeta, AssistantResponse, PreprocessResponse, SpeakResponse,
};
