//! Track creation, inspection and naming.

use serde::Deserialize;
use serde_json::json;

use super::common::{INVALID_TRACK, TrackAddress, insertion_point, object, track, track_mut};
use crate::dispatch::{ActionResult, DispatchTable};
use crate::host::Host;
use crate::song::TrackKind;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateTrack {
    #[serde(default)]
    index: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetTrackName {
    track_index: i64,
    name: String,
}

pub(super) fn register<H: Host + 'static>(table: &mut DispatchTable<H>) {
    table
        .register("create_midi_track", |host: &mut H, args: CreateTrack| {
            create_track(host, TrackKind::Midi, args)
        })
        .register("create_audio_track", |host: &mut H, args: CreateTrack| {
            create_track(host, TrackKind::Audio, args)
        })
        .register("get_track_info", get_track_info::<H>)
        .register("set_track_name", set_track_name::<H>);
}

fn create_track<H: Host>(host: &mut H, kind: TrackKind, args: CreateTrack) -> ActionResult {
    let song = host.song_mut();
    let index = insertion_point(args.index, song.tracks().len(), INVALID_TRACK)?;
    let position = song.create_track(kind, index);
    let message = match kind {
        TrackKind::Midi => "MIDI track created",
        TrackKind::Audio => "Audio track created",
    };
    Ok(object(json!({"message": message, "track_index": position})))
}

fn get_track_info<H: Host>(host: &mut H, TrackAddress { track_index }: TrackAddress) -> ActionResult {
    let track = track(host.song(), track_index)?;
    let clip_slots: Vec<_> = track
        .clip_slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            json!({
                "clip_index": index,
                "has_clip": slot.has_clip(),
                "clip_name": slot.clip.as_ref().map(|clip| clip.name.as_str()),
            })
        })
        .collect();
    Ok(object(json!({
        "track_index": track_index,
        "name": track.name,
        "has_midi_input": track.has_midi_input(),
        "has_audio_input": !track.has_midi_input(),
        "mute": track.mute,
        "solo": track.solo,
        "arm": track.arm,
        "clip_slots": clip_slots,
    })))
}

fn set_track_name<H: Host>(host: &mut H, args: SetTrackName) -> ActionResult {
    let track = track_mut(host.song_mut(), args.track_index)?;
    track.name.clone_from(&args.name);
    Ok(object(json!({"message": "Track renamed", "name": args.name})))
}
