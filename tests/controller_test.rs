//! Integration tests for the playback controller
//!
//! The backend, speech engine, audio player and prompt are replaced by
//! in-memory fakes so each flow's observable contract (status transitions,
//! displayed text, what got spoken or played) can be asserted exactly.

use litro::api::{AssistantResponse, PreprocessResponse, SpeakResponse, TtsApi};
use litro::controller::Controller;
use litro::playback::AudioPlayer;
use litro::speech::{SpeechEngine, TargetLanguage, VoiceDescriptor};
use litro::ui::{lock_ui, FlowToken, PlaybackSource, Prompt, SharedUi, Status, UiState};
use litro::{LitroError, Result};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ApiLog {
    preprocess_calls: usize,
    speak_calls: usize,
}

/// Scripted backend
struct FakeApi {
    processed: Option<String>,
    fail_preprocess: bool,
    speak_processed: Option<String>,
    speak_audio_url: Option<String>,
    fail_speak: bool,
    log: Arc<Mutex<ApiLog>>,
}

impl FakeApi {
    fn new() -> Self {
        Self {
            processed: Some("processed".to_string()),
            fail_preprocess: false,
            speak_processed: Some("processed".to_string()),
            speak_audio_url: Some("http://server/audio.mp3".to_string()),
            fail_speak: false,
            log: Arc::new(Mutex::new(ApiLog::default())),
        }
    }
}

impl TtsApi for FakeApi {
    fn preprocess(&self, _text: &str) -> Result<PreprocessResponse> {
        self.log.lock().unwrap().preprocess_calls += 1;
        if self.fail_preprocess {
            return Err(LitroError::Api("connection refused".to_string()));
        }
        Ok(PreprocessResponse {
            processed: self.processed.clone(),
        })
    }

    fn speak(&self, _text: &str) -> Result<SpeakResponse> {
        self.log.lock().unwrap().speak_calls += 1;
        if self.fail_speak {
            return Err(LitroError::Api("boom".to_string()));
        }
        Ok(SpeakResponse {
            processed: self.speak_processed.clone(),
            audio_url: self.speak_audio_url.clone(),
        })
    }

    fn ask(&self, _query: &str) -> Result<AssistantResponse> {
        Ok(AssistantResponse {
            answer: Some("kural answer".to_string()),
            audio_url: None,
            meta: None,
        })
    }
}

/// Engine that records utterances and completes immediately
struct FakeSpeech {
    ui: SharedUi,
    voices: Vec<VoiceDescriptor>,
    spoken: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl SpeechEngine for FakeSpeech {
    fn voices(&mut self) -> Result<Vec<VoiceDescriptor>> {
        Ok(self.voices.clone())
    }

    fn speak(
        &mut self,
        text: &str,
        _voice: Option<&VoiceDescriptor>,
        _fallback_tag: &str,
        flow: FlowToken,
    ) -> Result<()> {
        if self.fail {
            return Err(LitroError::Speech("synthesis failed".to_string()));
        }
        self.spoken.lock().unwrap().push(text.to_string());
        // Simulate the utterance-end callback
        lock_ui(&self.ui).set_status(flow, Status::Idle);
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        Ok(())
    }
}

enum PlayerBehavior {
    Play,
    Blocked,
    Fail,
}

struct FakePlayer {
    played: Arc<Mutex<Vec<String>>>,
    behavior: PlayerBehavior,
}

impl AudioPlayer for FakePlayer {
    fn play(&mut self, url: &str) -> Result<()> {
        match self.behavior {
            PlayerBehavior::Play => {
                self.played.lock().unwrap().push(url.to_string());
                Ok(())
            }
            PlayerBehavior::Blocked => {
                Err(LitroError::AudioBlocked("no output device".to_string()))
            }
            PlayerBehavior::Fail => Err(LitroError::Audio("decode error".to_string())),
        }
    }
}

struct FakePrompt {
    alerts: Arc<Mutex<Vec<String>>>,
    confirm_answer: bool,
}

impl Prompt for FakePrompt {
    fn alert(&mut self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn confirm(&mut self, _message: &str) -> bool {
        self.confirm_answer
    }
}

/// Everything a test needs to drive a controller and inspect side effects
struct Harness {
    controller: Controller,
    ui: SharedUi,
    api_log: Arc<Mutex<ApiLog>>,
    spoken: Arc<Mutex<Vec<String>>>,
    played: Arc<Mutex<Vec<String>>>,
    alerts: Arc<Mutex<Vec<String>>>,
    statuses: Arc<Mutex<Vec<Status>>>,
}

fn harness(api: FakeApi, voices: Vec<VoiceDescriptor>) -> Harness {
    harness_with(api, Some(voices), PlayerBehavior::Play, false, false)
}

fn harness_with(
    api: FakeApi,
    voices: Option<Vec<VoiceDescriptor>>,
    player_behavior: PlayerBehavior,
    confirm_answer: bool,
    speech_fails: bool,
) -> Harness {
    let ui = UiState::shared();

    let statuses = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&statuses);
    lock_ui(&ui).subscribe(Box::new(move |status| {
        recorded.lock().unwrap().push(status.clone());
    }));

    let api_log = Arc::clone(&api.log);
    let spoken = Arc::new(Mutex::new(Vec::new()));
    let played = Arc::new(Mutex::new(Vec::new()));
    let alerts = Arc::new(Mutex::new(Vec::new()));

    let engine: Option<Box<dyn SpeechEngine>> = voices.map(|voices| {
        Box::new(FakeSpeech {
            ui: Arc::clone(&ui),
            voices,
            spoken: Arc::clone(&spoken),
            fail: speech_fails,
        }) as Box<dyn SpeechEngine>
    });

    let player = FakePlayer {
        played: Arc::clone(&played),
        behavior: player_behavior,
    };
    let prompt = FakePrompt {
        alerts: Arc::clone(&alerts),
        confirm_answer,
    };

    let mut controller = Controller::new(
        Box::new(api),
        engine,
        Box::new(player),
        Box::new(prompt),
        Arc::clone(&ui),
        TargetLanguage::default(),
    );
    controller.refresh_voices().unwrap();

    Harness {
        controller,
        ui,
        api_log,
        spoken,
        played,
        alerts,
        statuses,
    }
}

fn tamil_voice() -> VoiceDescriptor {
    VoiceDescriptor::new("Valluvar", "ta-IN")
}

#[test]
fn test_preview_displays_processed_exactly() {
    let mut api = FakeApi::new();
    api.processed = Some("X".to_string());
    let mut h = harness(api, vec![tamil_voice()]);

    h.controller.preview("வணக்கம்");

    let ui = lock_ui(&h.ui);
    assert_eq!(ui.processed(), "X");
    assert_eq!(*ui.status(), Status::Idle);
}

#[test]
fn test_preview_empty_input_alerts_without_request() {
    let mut h = harness(FakeApi::new(), vec![tamil_voice()]);

    h.controller.preview("   ");

    assert_eq!(h.alerts.lock().unwrap().len(), 1);
    assert_eq!(h.api_log.lock().unwrap().preprocess_calls, 0);
    assert_eq!(*lock_ui(&h.ui).status(), Status::Idle);
}

#[test]
fn test_preview_failure_sets_generic_status() {
    let mut api = FakeApi::new();
    api.fail_preprocess = true;
    let mut h = harness(api, vec![tamil_voice()]);

    h.controller.preview("text");

    assert_eq!(
        *lock_ui(&h.ui).status(),
        Status::Error("Failed to get processed text".to_string())
    );
}

#[test]
fn test_local_flow_speaks_processed_text() {
    let mut api = FakeApi::new();
    api.processed = Some("X".to_string());
    let mut h = harness(api, vec![tamil_voice()]);

    h.controller.play_local("raw input");

    assert_eq!(lock_ui(&h.ui).processed(), "X");
    assert_eq!(*h.spoken.lock().unwrap(), vec!["X".to_string()]);
    // preprocessing -> playing -> idle
    assert_eq!(
        *h.statuses.lock().unwrap(),
        vec![
            Status::Preprocessing,
            Status::Playing(PlaybackSource::Local),
            Status::Idle,
        ]
    );
}

#[test]
fn test_local_flow_treats_empty_processed_as_missing() {
    // The backend can answer {"processed": ""}; an empty utterance would
    // never complete, so the raw text must be spoken instead
    let mut api = FakeApi::new();
    api.processed = Some(String::new());
    let mut h = harness(api, vec![tamil_voice()]);

    h.controller.play_local("raw input");

    assert_eq!(*h.spoken.lock().unwrap(), vec!["raw input".to_string()]);
    assert_eq!(*lock_ui(&h.ui).status(), Status::Idle);
}

#[test]
fn test_preview_shows_placeholder_for_empty_processed() {
    let mut api = FakeApi::new();
    api.processed = Some(String::new());
    let mut h = harness(api, vec![tamil_voice()]);

    h.controller.preview("text");

    assert_eq!(lock_ui(&h.ui).processed(), "—");
    assert_eq!(*lock_ui(&h.ui).status(), Status::Idle);
}

#[test]
fn test_local_flow_falls_back_to_raw_text_on_preprocess_failure() {
    let mut api = FakeApi::new();
    api.fail_preprocess = true;
    let mut h = harness(api, vec![tamil_voice()]);

    h.controller.play_local("raw input");

    assert_eq!(*h.spoken.lock().unwrap(), vec!["raw input".to_string()]);
    assert_eq!(*lock_ui(&h.ui).status(), Status::Idle);
}

#[test]
fn test_local_flow_uses_explicitly_selected_voice_without_heuristic_match() {
    // No Tamil voice at all, but the user picked one explicitly
    let voices = vec![VoiceDescriptor::new("Daniel", "en-GB")];
    let mut h = harness(FakeApi::new(), voices);
    assert!(h.controller.select_voice(1).is_some());

    h.controller.play_local("text");

    // No confirmation prompt: the selection counts as a usable voice
    assert_eq!(h.spoken.lock().unwrap().len(), 1);
    assert!(h.played.lock().unwrap().is_empty());
}

#[test]
fn test_local_flow_without_voice_accepts_remote_fallback() {
    let mut api = FakeApi::new();
    api.processed = Some("X".to_string());
    let mut h = harness_with(api, Some(vec![]), PlayerBehavior::Play, true, false);

    h.controller.play_local("text");

    assert!(h.spoken.lock().unwrap().is_empty());
    assert_eq!(
        *h.played.lock().unwrap(),
        vec!["http://server/audio.mp3".to_string()]
    );
    // The processed text shown is the preprocessing result, not overwritten
    // by the /speak response
    assert_eq!(lock_ui(&h.ui).processed(), "X");
    assert_eq!(h.api_log.lock().unwrap().speak_calls, 1);
    assert_eq!(*lock_ui(&h.ui).status(), Status::Idle);
}

#[test]
fn test_local_flow_without_voice_keeps_local_when_declined() {
    let mut api = FakeApi::new();
    api.processed = Some("X".to_string());
    let mut h = harness_with(api, Some(vec![]), PlayerBehavior::Play, false, false);

    h.controller.play_local("text");

    assert_eq!(*h.spoken.lock().unwrap(), vec!["X".to_string()]);
    assert!(h.played.lock().unwrap().is_empty());
    assert_eq!(h.api_log.lock().unwrap().speak_calls, 0);
}

#[test]
fn test_local_synthesis_error_sets_error_status() {
    let mut h = harness_with(
        FakeApi::new(),
        Some(vec![tamil_voice()]),
        PlayerBehavior::Play,
        false,
        true,
    );

    h.controller.play_local("text");

    assert_eq!(
        *lock_ui(&h.ui).status(),
        Status::Error("Local synthesis error".to_string())
    );
}

#[test]
fn test_server_flow_plays_audio_and_displays_processed() {
    let mut api = FakeApi::new();
    api.speak_processed = Some("server processed".to_string());
    let mut h = harness(api, vec![tamil_voice()]);

    h.controller.play_server("raw");

    assert_eq!(lock_ui(&h.ui).processed(), "server processed");
    assert_eq!(
        *h.played.lock().unwrap(),
        vec!["http://server/audio.mp3".to_string()]
    );
    assert_eq!(
        *h.statuses.lock().unwrap(),
        vec![
            Status::Requesting,
            Status::Playing(PlaybackSource::Remote),
            Status::Idle,
        ]
    );
}

#[test]
fn test_server_flow_without_audio_url_sets_no_audio() {
    let mut api = FakeApi::new();
    api.speak_audio_url = None;
    let mut h = harness(api, vec![tamil_voice()]);

    h.controller.play_server("raw");

    assert_eq!(*lock_ui(&h.ui).status(), Status::NoAudio);
    assert!(h.played.lock().unwrap().is_empty());
}

#[test]
fn test_server_flow_failure_sets_descriptive_status() {
    let mut api = FakeApi::new();
    api.fail_speak = true;
    let mut h = harness(api, vec![tamil_voice()]);

    h.controller.play_server("raw");

    match lock_ui(&h.ui).status() {
        Status::Error(message) => assert!(message.contains("Server TTS failed")),
        other => panic!("expected error status, got {:?}", other),
    }
    assert!(h.played.lock().unwrap().is_empty());
}

#[test]
fn test_blocked_playback_surfaces_distinct_status() {
    let mut h = harness_with(
        FakeApi::new(),
        Some(vec![tamil_voice()]),
        PlayerBehavior::Blocked,
        false,
        false,
    );

    h.controller.play_server("raw");

    assert_eq!(*lock_ui(&h.ui).status(), Status::Blocked);
}

#[test]
fn test_failed_playback_is_a_generic_error() {
    let mut h = harness_with(
        FakeApi::new(),
        Some(vec![tamil_voice()]),
        PlayerBehavior::Fail,
        false,
        false,
    );

    h.controller.play_server("raw");

    assert_eq!(
        *lock_ui(&h.ui).status(),
        Status::Error("Audio playback failed".to_string())
    );
}

#[test]
fn test_missing_platform_synthesis_disables_local_flow() {
    let mut h = harness_with(FakeApi::new(), None, PlayerBehavior::Play, false, false);

    assert!(!lock_ui(&h.ui).local_enabled());
    assert_eq!(*lock_ui(&h.ui).status(), Status::Unsupported);

    h.controller.play_local("text");

    // Alerted, and no preprocessing request went out
    assert_eq!(h.alerts.lock().unwrap().len(), 1);
    assert_eq!(h.api_log.lock().unwrap().preprocess_calls, 0);
}

#[test]
fn test_voice_selection_by_index() {
    let voices = vec![tamil_voice(), VoiceDescriptor::new("Daniel", "en-GB")];
    let mut h = harness(FakeApi::new(), voices);

    let voice = h.controller.select_voice(2).unwrap();
    assert_eq!(voice.name, "Daniel");
    assert_eq!(lock_ui(&h.ui).selected_voice(), Some("Daniel"));

    assert!(h.controller.select_voice(9).is_none());
    assert_eq!(lock_ui(&h.ui).selected_voice(), Some("Daniel"));

    assert!(h.controller.select_voice(0).is_none());
    assert_eq!(lock_ui(&h.ui).selected_voice(), None);
}

#[test]
fn test_assistant_flow_displays_answer() {
    let mut h = harness(FakeApi::new(), vec![tamil_voice()]);

    h.controller.ask("திருக்குறள் 1");

    assert_eq!(lock_ui(&h.ui).processed(), "kural answer");
    // The fake returns no audio asset
    assert_eq!(*lock_ui(&h.ui).status(), Status::NoAudio);
}
