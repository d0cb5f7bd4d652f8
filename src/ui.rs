//! UI state shared by the playback controller
//!
//! The status line, processed-text display, voice catalog and voice
//! selection live in a single `UiState` object that is injected into the
//! controller and the speech engine rather than held as globals. Every
//! change goes through an explicit setter so the state stays observable.

use crate::speech::VoiceDescriptor;
use log::debug;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// Where audio is currently coming from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackSource {
    /// Platform speech synthesis
    Local,
    /// Audio asset generated by the server
    Remote,
}

/// Current status of the playback controller
///
/// A single value overwritten by every operation's start/end/error
/// transition. No history is retained.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    /// Waiting for the preprocessing endpoint
    Preprocessing,
    /// Waiting for the server synthesis endpoint
    Requesting,
    Playing(PlaybackSource),
    /// Server responded without an audio asset
    NoAudio,
    /// The audio device refused playback; a fresh user action may succeed
    Blocked,
    /// Platform speech synthesis is absent for this session
    Unsupported,
    Error(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "idle"),
            Status::Preprocessing => write!(f, "Preprocessing text..."),
            Status::Requesting => write!(f, "Requesting server audio..."),
            Status::Playing(PlaybackSource::Local) => write!(f, "Playing (local synthesis)..."),
            Status::Playing(PlaybackSource::Remote) => write!(f, "Playing server audio..."),
            Status::NoAudio => write!(f, "No audio available from server"),
            Status::Blocked => write!(f, "Audio playback blocked. Start a new request to retry."),
            Status::Unsupported => write!(
                f,
                "Speech synthesis not supported on this platform. Use server playback."
            ),
            Status::Error(message) => write!(f, "{}", message),
        }
    }
}

/// Handle identifying one user-initiated flow
///
/// Issued by [`UiState::begin_flow`]. Status updates carry the token of the
/// flow they belong to; a token from a superseded flow can no longer write,
/// so a stale completion cannot overwrite a newer flow's display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowToken(u64);

impl FlowToken {
    pub(crate) fn from_raw(raw: u64) -> Self {
        FlowToken(raw)
    }

    pub(crate) fn raw(self) -> u64 {
        self.0
    }
}

/// Callback invoked after every status change
pub type StatusListener = Box<dyn FnMut(&Status) + Send>;

/// Observable UI state for the playback controller
pub struct UiState {
    /// Current status, overwritten synchronously by every transition
    status: Status,

    /// Most recently displayed processed text
    processed: String,

    /// Platform voice catalog, replaced wholesale on refresh, never merged
    catalog: Vec<VoiceDescriptor>,

    /// Explicit user voice selection, by name
    /// Looked up in the current catalog each time playback is requested
    selected_voice: Option<String>,

    /// False when platform speech synthesis is absent for this session
    local_enabled: bool,

    /// Generation counter backing flow tokens
    generation: u64,

    /// Status change subscribers
    listeners: Vec<StatusListener>,
}

/// Shared handle to the UI state
///
/// The speech engine's completion callback fires on a platform thread, so
/// the state sits behind a mutex.
pub type SharedUi = Arc<Mutex<UiState>>;

/// Lock a shared UI handle, recovering from poisoning
///
/// A panicked listener must not take the status display down with it.
pub fn lock_ui(ui: &SharedUi) -> MutexGuard<'_, UiState> {
    ui.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl UiState {
    pub fn new() -> Self {
        Self {
            status: Status::Idle,
            processed: String::new(),
            catalog: Vec::new(),
            selected_voice: None,
            local_enabled: true,
            generation: 0,
            listeners: Vec::new(),
        }
    }

    /// Create a shareable UI state
    pub fn shared() -> SharedUi {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Start a new flow, superseding any earlier one
    pub fn begin_flow(&mut self) -> FlowToken {
        self.generation += 1;
        FlowToken(self.generation)
    }

    /// Update the status on behalf of the given flow
    ///
    /// Writes from superseded flows are dropped.
    pub fn set_status(&mut self, flow: FlowToken, status: Status) {
        if flow.0 != self.generation {
            debug!("Dropping status '{}' from superseded flow", status);
            return;
        }
        debug!("Status: {}", status);
        self.status = status;
        for listener in &mut self.listeners {
            listener(&self.status);
        }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Register a status change listener
    pub fn subscribe(&mut self, listener: StatusListener) {
        self.listeners.push(listener);
    }

    pub fn set_processed(&mut self, text: impl Into<String>) {
        self.processed = text.into();
    }

    pub fn processed(&self) -> &str {
        &self.processed
    }

    /// Replace the voice catalog wholesale
    pub fn set_catalog(&mut self, voices: Vec<VoiceDescriptor>) {
        debug!("Voice catalog replaced: {} voices", voices.len());
        self.catalog = voices;
    }

    pub fn catalog(&self) -> &[VoiceDescriptor] {
        &self.catalog
    }

    /// Record or clear the explicit voice selection
    pub fn select_voice(&mut self, name: Option<String>) {
        self.selected_voice = name;
    }

    pub fn selected_voice(&self) -> Option<&str> {
        self.selected_voice.as_deref()
    }

    pub fn set_local_enabled(&mut self, enabled: bool) {
        self.local_enabled = enabled;
    }

    pub fn local_enabled(&self) -> bool {
        self.local_enabled
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

/// User prompt surface for alerts and confirmation dialogs
pub trait Prompt: Send {
    /// Blocking notification, no answer expected
    fn alert(&mut self, message: &str);

    /// Yes/no question; false corresponds to cancelling the dialog
    fn confirm(&mut self, message: &str) -> bool;
}

/// Prompt implementation reading answers from stdin
pub struct StdPrompt;

impl Prompt for StdPrompt {
    fn alert(&mut self, message: &str) {
        println!("! {}", message);
    }

    fn confirm(&mut self, message: &str) -> bool {
        print!("{} [y/N] ", message);
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes" | "Yes")
    }
}
