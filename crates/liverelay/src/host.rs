//! The scripting surface a host application exposes to the remote script.
//!
//! Everything behind [`Host`] must only be touched from the host thread. The
//! relay guarantees this by calling into the host solely from the tick hook.

use std::cell::RefCell;

use thiserror::Error;
use tracing::info;

use crate::song::{Device, DeviceParameter, Song, TrackKind};

const HOST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");

/// Failures raised by the host's scripting API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host refused or could not complete an API call.
    #[error("host API call '{call}' failed: {message}")]
    CallFailed {
        /// Name of the API entry point.
        call: &'static str,
        /// Host-supplied description.
        message: String,
    },
    /// The object an API call referred to no longer exists.
    #[error("host object is no longer available: {0}")]
    Stale(String),
}

impl HostError {
    /// Builds a [`HostError::CallFailed`].
    #[must_use]
    pub fn call_failed(call: &'static str, message: impl Into<String>) -> Self {
        Self::CallFailed {
            call,
            message: message.into(),
        }
    }
}

/// Host-side API reachable from the tick hook.
pub trait Host {
    /// Writes one line to the host's own log.
    fn log_message(&self, message: &str);

    /// Version string of the running host application.
    ///
    /// # Errors
    ///
    /// Returns a [`HostError`] when the host cannot report its version.
    fn application_version(&self) -> Result<String, HostError>;

    /// The current session.
    fn song(&self) -> &Song;

    /// The current session, mutably.
    fn song_mut(&mut self) -> &mut Song;
}

/// In-memory host used by the standalone harness and by tests.
#[derive(Debug)]
pub struct SimulatedHost {
    song: Song,
    version: Result<String, HostError>,
    log: RefCell<Vec<String>>,
}

impl SimulatedHost {
    /// Version reported by [`SimulatedHost::new`].
    pub const DEFAULT_VERSION: &'static str = "12.1.0";

    /// Creates a host with an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::with_song(Song::new())
    }

    /// Creates a host around an existing session.
    #[must_use]
    pub fn with_song(song: Song) -> Self {
        Self {
            song,
            version: Ok(Self::DEFAULT_VERSION.to_owned()),
            log: RefCell::new(Vec::new()),
        }
    }

    /// Session with two MIDI tracks, one audio track and four scenes. The
    /// audio track carries an Auto Filter.
    #[must_use]
    pub fn demo() -> Self {
        let mut song = Song::new();
        for _ in 0..4 {
            song.create_scene(None);
        }
        song.create_track(TrackKind::Midi, None);
        song.create_track(TrackKind::Midi, None);
        let audio = song.create_track(TrackKind::Audio, None);
        if let Some(track) = song.track_mut(audio) {
            let cutoff = DeviceParameter::continuous("Frequency", 1_000.0, 20.0, 20_000.0);
            let resonance = DeviceParameter::continuous("Resonance", 0.3, 0.0, 1.25);
            track.devices.push(
                Device::new("Auto Filter", "AutoFilter")
                    .with_parameter(cutoff)
                    .with_parameter(resonance),
            );
        }
        Self::with_song(song)
    }

    /// Makes [`Host::application_version`] fail with `error`.
    #[must_use]
    pub fn with_version_error(mut self, error: HostError) -> Self {
        self.version = Err(error);
        self
    }

    /// Lines written through [`Host::log_message`], oldest first.
    #[must_use]
    pub fn log_lines(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for SimulatedHost {
    fn log_message(&self, message: &str) {
        info!(target: HOST_TARGET, "{message}");
        self.log.borrow_mut().push(message.to_owned());
    }

    fn application_version(&self) -> Result<String, HostError> {
        self.version.clone()
    }

    fn song(&self) -> &Song {
        &self.song
    }

    fn song_mut(&mut self) -> &mut Song {
        &mut self.song
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn demo_session_layout() {
        let host = SimulatedHost::demo();
        let kinds: Vec<TrackKind> = host.song().tracks().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TrackKind::Midi, TrackKind::Midi, TrackKind::Audio]);
        assert_eq!(host.song().scenes().len(), 4);
        let devices: Vec<usize> = host.song().tracks().iter().map(|t| t.devices.len()).collect();
        assert_eq!(devices, vec![0, 0, 1]);
    }

    #[rstest]
    fn version_failure_is_reported() {
        let host = SimulatedHost::new().with_version_error(HostError::call_failed(
            "get_major_version",
            "not ready",
        ));
        let error = host.application_version().expect_err("version should fail");
        assert!(error.to_string().contains("not ready"));
    }

    #[rstest]
    fn log_messages_are_recorded() {
        let host = SimulatedHost::new();
        host.log_message("hello");
        assert_eq!(host.log_lines(), vec!["hello".to_owned()]);
    }
}
