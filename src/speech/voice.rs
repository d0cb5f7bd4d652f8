//! Voice descriptors and voice matching
//!
//! Platform voices are flattened into plain `VoiceDescriptor` values so the
//! matcher stays pure and testable without platform enumeration.

use serde::{Deserialize, Serialize};

/// A platform-exposed synthesis voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    /// Human-readable voice name, unique per catalog in practice
    pub name: String,
    /// BCP 47 language tag, e.g. "ta-IN"
    pub lang: String,
}

impl VoiceDescriptor {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// The spoken language the client is tuned for
///
/// Used to bias voice selection; configurable, Tamil by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLanguage {
    /// Short language code matched against voice tags, e.g. "ta"
    pub code: String,
    /// Display name matched against voice names, e.g. "Tamil"
    pub name: String,
    /// Full tag applied when no voice matches, e.g. "ta-IN"
    pub tag: String,
}

impl Default for TargetLanguage {
    fn default() -> Self {
        Self {
            code: "ta".to_string(),
            name: "Tamil".to_string(),
            tag: "ta-IN".to_string(),
        }
    }
}

/// Pick a voice from the catalog
///
/// Policy, in order:
/// 1. an explicit selection whose name exists in the catalog;
/// 2. the first voice whose language tag starts with the target short code;
/// 3. the first voice whose name contains the target language name
///    (case-insensitive);
/// 4. none.
///
/// Tag correctness deliberately outranks the name heuristic.
pub fn match_voice<'a>(
    catalog: &'a [VoiceDescriptor],
    selected: Option<&str>,
    language: &TargetLanguage,
) -> Option<&'a VoiceDescriptor> {
    if let Some(name) = selected {
        if let Some(voice) = catalog.iter().find(|v| v.name == name) {
            return Some(voice);
        }
    }

    if let Some(voice) = catalog.iter().find(|v| v.lang.starts_with(&language.code)) {
        return Some(voice);
    }

    let needle = language.name.to_lowercase();
    catalog.iter().find(|v| v.name.to_lowercase().contains(&needle))
}
