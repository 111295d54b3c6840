//! Song-level transport actions.

use serde::Deserialize;
use serde_json::json;

use super::common::object;
use crate::dispatch::{ActionError, ActionResult, DispatchTable, NoArguments};
use crate::host::Host;
use crate::song::{MAX_TEMPO, MIN_TEMPO};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetTempo {
    bpm: f64,
}

pub(super) fn register<H: Host + 'static>(table: &mut DispatchTable<H>) {
    table
        .register("get_session_info", get_session_info::<H>)
        .register("start_playback", start_playback::<H>)
        .register("stop_playback", stop_playback::<H>)
        .register("set_tempo", set_tempo::<H>);
}

fn get_session_info<H: Host>(host: &mut H, _: NoArguments) -> ActionResult {
    let song = host.song();
    Ok(object(json!({
        "is_playing": song.is_playing,
        "tempo": song.tempo,
        "signature_numerator": song.signature_numerator,
        "signature_denominator": song.signature_denominator,
        "track_count": song.tracks().len(),
        "scene_count": song.scenes().len(),
    })))
}

fn start_playback<H: Host>(host: &mut H, _: NoArguments) -> ActionResult {
    host.song_mut().is_playing = true;
    Ok(object(json!({"message": "Playback started"})))
}

fn stop_playback<H: Host>(host: &mut H, _: NoArguments) -> ActionResult {
    host.song_mut().is_playing = false;
    Ok(object(json!({"message": "Playback stopped"})))
}

fn set_tempo<H: Host>(host: &mut H, SetTempo { bpm }: SetTempo) -> ActionResult {
    if !(MIN_TEMPO..=MAX_TEMPO).contains(&bpm) {
        return Err(ActionError::rejected(format!(
            "Tempo must be between {MIN_TEMPO} and {MAX_TEMPO} BPM"
        )));
    }
    host.song_mut().tempo = bpm;
    Ok(object(json!({"message": "Tempo set", "bpm": bpm})))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::host::SimulatedHost;

    #[rstest]
    fn tempo_outside_range_is_rejected() {
        let mut host = SimulatedHost::demo();
        let error = set_tempo(&mut host, SetTempo { bpm: 1000.0 }).expect_err("too fast");
        assert!(!error.is_fault());
        assert_eq!(error.to_string(), "Tempo must be between 20 and 999 BPM");
        assert!((host.song().tempo - 120.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn transport_toggles_playback() {
        let mut host = SimulatedHost::demo();
        start_playback(&mut host, NoArguments {}).expect("start");
        assert!(host.song().is_playing);
        stop_playback(&mut host, NoArguments {}).expect("stop");
        assert!(!host.song().is_playing);
    }

    #[rstest]
    fn session_info_counts_tracks_and_scenes() {
        let mut host = SimulatedHost::demo();
        let info = get_session_info(&mut host, NoArguments {}).expect("info");
        assert_eq!(info.get("track_count"), Some(&json!(3)));
        assert_eq!(info.get("scene_count"), Some(&json!(4)));
    }
}
