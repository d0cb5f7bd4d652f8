//! Local speech synthesis

pub mod synth;
pub mod voice;

pub use synth::{NativeSpeech, SpeechEngine, PITCH_SCALE, RATE_SCALE};
pub use voice::{match_voice, TargetLanguage, VoiceDescriptor};
