//! Platform speech synthesis backend
//!
//! Wraps the `tts` crate, which binds Speech Dispatcher on Linux,
//! AVFoundation on macOS and SAPI on Windows. Playback completion is only
//! observable through the shared status: the engine registers an
//! utterance-end callback that returns the owning flow's status to idle.

use crate::speech::voice::VoiceDescriptor;
use crate::ui::{lock_ui, FlowToken, SharedUi, Status};
use crate::{LitroError, Result};
use log::{debug, error, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tts::Tts;

/// Rate multiplier applied to the platform's normal speaking rate
pub const RATE_SCALE: f32 = 0.95;

/// Pitch multiplier applied to the platform's normal pitch
pub const PITCH_SCALE: f32 = 1.0;

/// Local speech synthesis interface
///
/// Submitting an utterance is fire-and-forget: completion is reported
/// through the UI status, never through a return value.
pub trait SpeechEngine: Send {
    /// Enumerate the platform's installed voices
    fn voices(&mut self) -> Result<Vec<VoiceDescriptor>>;

    /// Cancel in-flight synthesis and submit a new utterance
    ///
    /// `voice` is the matched voice if any; otherwise the engine falls back
    /// to a voice for `fallback_tag`, or the platform default. `flow` is the
    /// flow the eventual completion belongs to.
    fn speak(
        &mut self,
        text: &str,
        voice: Option<&VoiceDescriptor>,
        fallback_tag: &str,
        flow: FlowToken,
    ) -> Result<()>;

    /// Cancel/silence current synthesis
    fn cancel(&mut self) -> Result<()>;
}

/// Speech engine backed by the `tts` crate
pub struct NativeSpeech {
    tts: Tts,

    /// Flow owning the most recently submitted utterance
    /// Read by the utterance-end callback to attribute completion
    active_flow: Arc<AtomicU64>,
}

impl NativeSpeech {
    /// Initialize platform speech synthesis
    ///
    /// Fails when the platform has no synthesis support; the caller then
    /// disables local playback for the session.
    pub fn new(ui: SharedUi) -> Result<Self> {
        debug!("Initializing platform speech synthesis");

        let mut tts = Tts::default()
            .map_err(|e| LitroError::Speech(format!("Failed to initialize synthesis: {}", e)))?;

        let active_flow = Arc::new(AtomicU64::new(0));

        let features = tts.supported_features();
        if features.utterance_callbacks {
            let flow = Arc::clone(&active_flow);
            tts.on_utterance_end(Some(Box::new(move |_id| {
                let token = FlowToken::from_raw(flow.load(Ordering::Relaxed));
                lock_ui(&ui).set_status(token, Status::Idle);
            })))
            .map_err(|e| {
                LitroError::Speech(format!("Failed to register end callback: {}", e))
            })?;
        } else {
            warn!("Utterance callbacks unsupported; status will not return to idle after local playback");
        }

        debug!("Platform speech synthesis ready");

        Ok(Self { tts, active_flow })
    }

    /// Select a platform voice by descriptor name, or by language tag prefix
    /// when no descriptor was matched
    fn apply_voice(&mut self, voice: Option<&VoiceDescriptor>, fallback_tag: &str) -> Result<()> {
        if !self.tts.supported_features().voice {
            debug!("Voice selection unsupported on this platform");
            return Ok(());
        }

        let platform_voices = self
            .tts
            .voices()
            .map_err(|e| LitroError::Speech(format!("Failed to enumerate voices: {}", e)))?;

        let chosen = match voice {
            Some(descriptor) => platform_voices
                .iter()
                .find(|v| v.name() == descriptor.name),
            // Best-effort fallback: any voice carrying the default tag's
            // primary subtag, else the platform default applies
            None => {
                let code = fallback_tag.split('-').next().unwrap_or(fallback_tag);
                platform_voices
                    .iter()
                    .find(|v| v.language().to_string().starts_with(code))
            }
        };

        match chosen {
            Some(platform_voice) => {
                debug!("Selecting voice {}", platform_voice.name());
                self.tts
                    .set_voice(platform_voice)
                    .map_err(|e| LitroError::Speech(format!("Failed to set voice: {}", e)))?;
            }
            None => {
                debug!("No voice for request; platform default applies");
            }
        }

        Ok(())
    }

    /// Apply the fixed rate and pitch scales relative to platform normals
    fn apply_rate_and_pitch(&mut self) -> Result<()> {
        let features = self.tts.supported_features();

        if features.rate {
            let rate = (self.tts.normal_rate() * RATE_SCALE)
                .clamp(self.tts.min_rate(), self.tts.max_rate());
            self.tts
                .set_rate(rate)
                .map_err(|e| LitroError::Speech(format!("Failed to set rate: {}", e)))?;
        }

        if features.pitch {
            let pitch = (self.tts.normal_pitch() * PITCH_SCALE)
                .clamp(self.tts.min_pitch(), self.tts.max_pitch());
            self.tts
                .set_pitch(pitch)
                .map_err(|e| LitroError::Speech(format!("Failed to set pitch: {}", e)))?;
        }

        Ok(())
    }
}

impl SpeechEngine for NativeSpeech {
    fn voices(&mut self) -> Result<Vec<VoiceDescriptor>> {
        let voices = self
            .tts
            .voices()
            .map_err(|e| LitroError::Speech(format!("Failed to enumerate voices: {}", e)))?;

        Ok(voices
            .iter()
            .map(|v| VoiceDescriptor::new(v.name(), v.language().to_string()))
            .collect())
    }

    fn speak(
        &mut self,
        text: &str,
        voice: Option<&VoiceDescriptor>,
        fallback_tag: &str,
        flow: FlowToken,
    ) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        // Cancel any in-flight utterance before queueing the new one
        self.cancel()?;

        self.apply_voice(voice, fallback_tag)?;
        self.apply_rate_and_pitch()?;

        self.active_flow.store(flow.raw(), Ordering::Relaxed);

        debug!("Speaking {} chars", text.chars().count());
        self.tts.speak(text, false).map_err(|e| {
            error!("Failed to speak: {}", e);
            LitroError::Speech(format!("Speak failed: {}", e))
        })?;

        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        debug!("Cancelling speech");
        self.tts.stop().map_err(|e| {
            error!("Failed to cancel speech: {}", e);
            LitroError::Speech(format!("Cancel failed: {}", e))
        })?;

        Ok(())
    }
}
