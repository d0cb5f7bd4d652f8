//! Playback controller
//!
//! Coordinates the backend API, local speech synthesis and remote audio
//! playback behind the interactive commands. Every collaborator enters
//! through a trait seam, so the flows are testable with in-memory fakes.
//!
//! Failures never abort the session: each one collapses to a status string
//! plus a log entry, and every retry is a fresh user command.

use crate::api::TtsApi;
use crate::playback::AudioPlayer;
use crate::speech::{match_voice, SpeechEngine, TargetLanguage, VoiceDescriptor};
use crate::ui::{lock_ui, FlowToken, PlaybackSource, Prompt, SharedUi, Status};
use crate::{LitroError, Result};
use log::{debug, error, info, warn};

/// UI-event-driven coordinator for the three playback flows
pub struct Controller {
    api: Box<dyn TtsApi>,
    /// None when platform speech synthesis is unavailable for the session
    engine: Option<Box<dyn SpeechEngine>>,
    player: Box<dyn AudioPlayer>,
    prompt: Box<dyn Prompt>,
    ui: SharedUi,
    language: TargetLanguage,
}

impl Controller {
    pub fn new(
        api: Box<dyn TtsApi>,
        engine: Option<Box<dyn SpeechEngine>>,
        player: Box<dyn AudioPlayer>,
        prompt: Box<dyn Prompt>,
        ui: SharedUi,
        language: TargetLanguage,
    ) -> Self {
        if engine.is_none() {
            // Signaled once; local playback stays disabled for the session
            let mut state = lock_ui(&ui);
            let flow = state.begin_flow();
            state.set_status(flow, Status::Unsupported);
            state.set_local_enabled(false);
        }

        Self {
            api,
            engine,
            player,
            prompt,
            ui,
            language,
        }
    }

    /// Shared UI state handle
    pub fn ui(&self) -> &SharedUi {
        &self.ui
    }

    /// Replace the voice catalog with the platform's current list
    ///
    /// No-op when local synthesis is disabled.
    pub fn refresh_voices(&mut self) -> Result<()> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };

        let voices = engine.voices()?;
        info!("Loaded {} platform voices", voices.len());
        lock_ui(&self.ui).set_catalog(voices);
        Ok(())
    }

    /// Record the explicit voice selection by catalog index
    ///
    /// Index 0 clears the selection (the placeholder entry); out-of-range
    /// indices return `None` and change nothing.
    pub fn select_voice(&mut self, index: usize) -> Option<VoiceDescriptor> {
        let mut ui = lock_ui(&self.ui);
        if index == 0 {
            ui.select_voice(None);
            return None;
        }

        let voice = ui.catalog().get(index - 1).cloned()?;
        ui.select_voice(Some(voice.name.clone()));
        Some(voice)
    }

    /// "Browser" flow: preprocess remotely, speak locally
    ///
    /// Falls back to speaking the raw text when preprocessing fails, and
    /// offers remote synthesis when no target-language voice exists.
    pub fn play_local(&mut self, text: &str) {
        let Some(text) = self.require_text(text) else {
            return;
        };

        if self.engine.is_none() {
            self.prompt
                .alert("Local speech synthesis is not available. Use the server flow instead.");
            return;
        }

        let flow = self.begin_flow();
        lock_ui(&self.ui).set_status(flow, Status::Preprocessing);

        let processed = match self.api.preprocess(&text) {
            // An empty field counts as missing, like the raw-text fallback
            Ok(response) => response
                .processed
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| text.clone()),
            Err(e) => {
                // Degrade to the unprocessed input rather than losing the click
                warn!("Preprocess request failed, falling back to raw text: {}", e);
                self.speak_local(flow, &text);
                return;
            }
        };

        lock_ui(&self.ui).set_processed(processed.clone());

        let usable = {
            let ui = lock_ui(&self.ui);
            match_voice(ui.catalog(), ui.selected_voice(), &self.language).cloned()
        };

        match usable {
            Some(voice) => self.speak_local_with(flow, &processed, Some(voice)),
            None => {
                let use_remote = self.prompt.confirm(&format!(
                    "No {} voice detected. Local synthesis may sound incorrect. \
                     Use server synthesis instead?",
                    self.language.name
                ));
                if use_remote {
                    self.play_remote(flow, &processed, false);
                } else {
                    self.speak_local(flow, &processed);
                }
            }
        }
    }

    /// "Server" flow: one-step remote synthesis of the raw text
    pub fn play_server(&mut self, text: &str) {
        let Some(text) = self.require_text(text) else {
            return;
        };

        let flow = self.begin_flow();
        self.play_remote(flow, &text, true);
    }

    /// Preview flow: display preprocessed text, never audio
    pub fn preview(&mut self, text: &str) {
        let Some(text) = self.require_text(text) else {
            return;
        };

        let flow = self.begin_flow();
        lock_ui(&self.ui).set_status(flow, Status::Preprocessing);

        match self.api.preprocess(&text) {
            Ok(response) => {
                let mut ui = lock_ui(&self.ui);
                ui.set_processed(
                    response
                        .processed
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| "—".to_string()),
                );
                ui.set_status(flow, Status::Idle);
            }
            Err(e) => {
                error!("Preview preprocess failed: {}", e);
                lock_ui(&self.ui)
                    .set_status(flow, Status::Error("Failed to get processed text".to_string()));
            }
        }
    }

    /// Assistant flow over `/litro`: display the answer, play audio if any
    ///
    /// Available as a capability; not bound to an interactive command.
    pub fn ask(&mut self, query: &str) {
        let Some(query) = self.require_text(query) else {
            return;
        };

        let flow = self.begin_flow();
        lock_ui(&self.ui).set_status(flow, Status::Requesting);

        let response = match self.api.ask(&query) {
            Ok(response) => response,
            Err(e) => {
                error!("Assistant request failed: {}", e);
                lock_ui(&self.ui)
                    .set_status(flow, Status::Error(format!("Server error: {}", e)));
                return;
            }
        };

        if let Some(meta) = &response.meta {
            debug!(
                "Assistant answer via {} (confidence {:.2})",
                meta.method, meta.confidence
            );
        }

        lock_ui(&self.ui).set_processed(
            response
                .answer
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "—".to_string()),
        );

        match response.audio_url {
            Some(url) => self.play_audio(flow, &url),
            None => lock_ui(&self.ui).set_status(flow, Status::NoAudio),
        }
    }

    /// Shared tail of the remote synthesis flows
    ///
    /// `display_processed` mirrors the two callers: the server flow shows
    /// the returned text, the no-voice fallback already displayed it.
    fn play_remote(&mut self, flow: FlowToken, text: &str, display_processed: bool) {
        lock_ui(&self.ui).set_status(flow, Status::Requesting);

        let response = match self.api.speak(text) {
            Ok(response) => response,
            Err(e) => {
                error!("Server synthesis request failed: {}", e);
                lock_ui(&self.ui)
                    .set_status(flow, Status::Error(format!("Server TTS failed: {}", e)));
                return;
            }
        };

        if display_processed {
            lock_ui(&self.ui).set_processed(response.processed.clone().unwrap_or_default());
        }

        match response.audio_url {
            Some(url) => self.play_audio(flow, &url),
            None => lock_ui(&self.ui).set_status(flow, Status::NoAudio),
        }
    }

    /// Play a returned audio asset, mapping failures to statuses
    fn play_audio(&mut self, flow: FlowToken, url: &str) {
        lock_ui(&self.ui).set_status(flow, Status::Playing(PlaybackSource::Remote));

        match self.player.play(url) {
            Ok(()) => lock_ui(&self.ui).set_status(flow, Status::Idle),
            Err(LitroError::AudioBlocked(e)) => {
                error!("Audio playback blocked: {}", e);
                lock_ui(&self.ui).set_status(flow, Status::Blocked);
            }
            Err(e) => {
                error!("Audio playback failed: {}", e);
                lock_ui(&self.ui)
                    .set_status(flow, Status::Error("Audio playback failed".to_string()));
            }
        }
    }

    /// Speak locally with a freshly matched voice
    fn speak_local(&mut self, flow: FlowToken, text: &str) {
        let voice = {
            let ui = lock_ui(&self.ui);
            match_voice(ui.catalog(), ui.selected_voice(), &self.language).cloned()
        };
        self.speak_local_with(flow, text, voice);
    }

    /// Submit an utterance to the local engine
    ///
    /// Status moves to playing before submission; completion comes back
    /// through the engine's end callback, errors collapse to a status here.
    fn speak_local_with(&mut self, flow: FlowToken, text: &str, voice: Option<VoiceDescriptor>) {
        if self.engine.is_none() {
            debug!("Local playback requested while disabled");
            return;
        }

        lock_ui(&self.ui).set_status(flow, Status::Playing(PlaybackSource::Local));

        if let Some(engine) = self.engine.as_mut() {
            if let Err(e) = engine.speak(text, voice.as_ref(), &self.language.tag, flow) {
                error!("Local synthesis failed: {}", e);
                lock_ui(&self.ui)
                    .set_status(flow, Status::Error("Local synthesis error".to_string()));
            }
        }
    }

    fn begin_flow(&self) -> FlowToken {
        lock_ui(&self.ui).begin_flow()
    }

    /// Trim the input, alerting and aborting on empty text
    ///
    /// The alert fires before any network request is issued.
    fn require_text(&mut self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.prompt
                .alert(&format!("Please enter {} text.", self.language.name));
            return None;
        }
        Some(trimmed.to_string())
    }
}
