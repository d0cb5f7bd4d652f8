//! Playback of remote audio assets
//!
//! The server hands back audio by URL; the asset is fetched in full and fed
//! through the default output device. Playback blocks the current flow,
//! which keeps a single flow's transitions serialized.

use crate::{LitroError, Result};
use log::debug;
use reqwest::blocking::Client;
use rodio::{Decoder, OutputStream, Sink};
use std::io::Cursor;
use std::time::Duration;

/// Audio asset player
pub trait AudioPlayer: Send {
    /// Fetch and play the asset at `url`, blocking until playback ends
    ///
    /// Returns [`LitroError::AudioBlocked`] when the output device refuses
    /// playback, so callers can surface a distinct retryable status.
    fn play(&mut self, url: &str) -> Result<()>;
}

/// Player backed by rodio and the default output device
pub struct RodioPlayer {
    client: Client,
}

impl RodioPlayer {
    /// Build a player fetching assets with the given timeout
    ///
    /// `None` waits indefinitely, same as the backend API client; the
    /// blocking client's own 30-second default would cut large assets off.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LitroError::Audio(format!("Failed to build audio fetcher: {}", e)))?;

        Ok(Self { client })
    }
}

impl AudioPlayer for RodioPlayer {
    fn play(&mut self, url: &str) -> Result<()> {
        debug!("Fetching audio asset {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| LitroError::Audio(format!("Failed to fetch audio: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LitroError::Audio(format!(
                "Audio fetch failed: HTTP {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| LitroError::Audio(format!("Failed to read audio body: {}", e)))?
            .to_vec();

        debug!("Playing {} bytes of audio", bytes.len());

        // No usable output device is the native analogue of a rejected
        // autoplay: a fresh user action may succeed
        let (_stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| LitroError::AudioBlocked(format!("No output device: {}", e)))?;

        let source = Decoder::new(Cursor::new(bytes))
            .map_err(|e| LitroError::Audio(format!("Failed to decode audio: {}", e)))?;

        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| LitroError::AudioBlocked(format!("Output device refused: {}", e)))?;

        sink.append(source);
        sink.sleep_until_end();

        debug!("Audio playback finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_builds_with_and_without_timeout() {
        assert!(RodioPlayer::new(None).is_ok());
        assert!(RodioPlayer::new(Some(Duration::from_secs(30))).is_ok());
    }
}
