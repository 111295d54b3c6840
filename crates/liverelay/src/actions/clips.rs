//! Clip-slot actions: create, delete, duplicate, launch, stop, inspect, rename.
//!
//! Every action here addresses a slot by `track_index` and `clip_index`;
//! legacy clients may still send `scene_index`, which the processor rewrites
//! before the parameters reach these handlers.

use serde::Deserialize;
use serde_json::json;

use super::common::{
    INVALID_SCENE, NO_CLIP, NOT_MIDI_TRACK, SLOT_OCCUPIED, SlotAddress, clip, clip_mut, object,
    position, slot_mut, track_mut,
};
use crate::dispatch::{ActionError, ActionResult, DispatchTable, NoArguments};
use crate::host::Host;
use crate::song::Clip;

const DEFAULT_CLIP_LENGTH: f64 = 4.0;

const fn default_clip_length() -> f64 {
    DEFAULT_CLIP_LENGTH
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateMidiClip {
    track_index: i64,
    clip_index: i64,
    #[serde(default = "default_clip_length")]
    length: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetClipName {
    track_index: i64,
    clip_index: i64,
    name: String,
}

pub(super) fn register<H: Host + 'static>(table: &mut DispatchTable<H>) {
    table
        .register("create_midi_clip", create_midi_clip::<H>)
        .register("delete_clip", delete_clip::<H>)
        .register("duplicate_clip", duplicate_clip::<H>)
        .register("launch_clip", launch_clip::<H>)
        .register("stop_clip", stop_clip::<H>)
        .register("stop_all_clips", stop_all_clips::<H>)
        .register("get_clip_info", get_clip_info::<H>)
        .register("set_clip_name", set_clip_name::<H>);
}

fn create_midi_clip<H: Host>(host: &mut H, args: CreateMidiClip) -> ActionResult {
    let track = track_mut(host.song_mut(), args.track_index)?;
    let is_midi = track.has_midi_input();
    let slot = slot_mut(track, args.clip_index, INVALID_SCENE)?;
    if !is_midi {
        return Err(ActionError::rejected(NOT_MIDI_TRACK));
    }
    if slot.has_clip() {
        return Err(ActionError::rejected(SLOT_OCCUPIED));
    }
    if args.length <= 0.0 {
        return Err(ActionError::rejected("Clip length must be positive"));
    }
    slot.clip = Some(Clip::midi(args.length));
    Ok(object(json!({
        "message": "MIDI clip created",
        "track_index": args.track_index,
        "clip_index": args.clip_index,
        "length": args.length,
    })))
}

fn delete_clip<H: Host>(host: &mut H, address: SlotAddress) -> ActionResult {
    let track = track_mut(host.song_mut(), address.track_index)?;
    let slot = slot_mut(track, address.clip_index, INVALID_SCENE)?;
    if slot.clip.take().is_none() {
        return Err(ActionError::rejected(NO_CLIP));
    }
    Ok(object(json!({"message": "Clip deleted"})))
}

fn duplicate_clip<H: Host>(host: &mut H, address: SlotAddress) -> ActionResult {
    let track = track_mut(host.song_mut(), address.track_index)?;
    let source = position(address.clip_index, track.clip_slots.len(), INVALID_SCENE)?;
    let mut copy = track
        .clip_slots
        .get(source)
        .and_then(|slot| slot.clip.clone())
        .ok_or_else(|| ActionError::rejected(NO_CLIP))?;
    let (destination, slot) = track
        .clip_slots
        .iter_mut()
        .enumerate()
        .skip(source + 1)
        .find(|(_, slot)| !slot.has_clip())
        .ok_or_else(|| ActionError::rejected("No empty slot available after source slot"))?;
    copy.is_playing = false;
    slot.clip = Some(copy);
    Ok(object(json!({
        "message": "Clip duplicated",
        "source_clip_index": source,
        "destination_clip_index": destination,
    })))
}

fn launch_clip<H: Host>(host: &mut H, address: SlotAddress) -> ActionResult {
    let track = track_mut(host.song_mut(), address.track_index)?;
    let slot = position(address.clip_index, track.clip_slots.len(), INVALID_SCENE)?;
    if !track.fire(slot) {
        return Err(ActionError::rejected(NO_CLIP));
    }
    Ok(object(json!({"message": "Clip launched"})))
}

fn stop_clip<H: Host>(host: &mut H, address: SlotAddress) -> ActionResult {
    let track = track_mut(host.song_mut(), address.track_index)?;
    let slot = slot_mut(track, address.clip_index, INVALID_SCENE)?;
    if let Some(clip) = slot.clip.as_mut() {
        clip.is_playing = false;
    }
    Ok(object(json!({"message": "Clip stopped"})))
}

fn stop_all_clips<H: Host>(host: &mut H, _: NoArguments) -> ActionResult {
    host.song_mut().stop_all_clips();
    Ok(object(json!({"message": "All clips stopped"})))
}

fn get_clip_info<H: Host>(host: &mut H, address: SlotAddress) -> ActionResult {
    let clip = clip(host.song(), address)?;
    Ok(object(json!({
        "name": clip.name,
        "length": clip.length,
        "loop_start": clip.loop_start,
        "loop_end": clip.loop_end,
        "is_midi_clip": clip.is_midi,
        "is_audio_clip": !clip.is_midi,
        "is_playing": clip.is_playing,
        "muted": clip.muted,
        "color": clip.color,
    })))
}

fn set_clip_name<H: Host>(host: &mut H, args: SetClipName) -> ActionResult {
    let address = SlotAddress {
        track_index: args.track_index,
        clip_index: args.clip_index,
    };
    clip_mut(host.song_mut(), address)?.name.clone_from(&args.name);
    Ok(object(json!({"message": "Clip renamed", "name": args.name})))
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::host::SimulatedHost;

    const fn at(track_index: i64, clip_index: i64) -> SlotAddress {
        SlotAddress {
            track_index,
            clip_index,
        }
    }

    #[fixture]
    fn host() -> SimulatedHost {
        let mut host = SimulatedHost::demo();
        create_midi_clip(
            &mut host,
            CreateMidiClip {
                track_index: 0,
                clip_index: 0,
                length: 8.0,
            },
        )
        .expect("seed clip");
        host
    }

    #[rstest]
    #[case(5, 0, "Invalid track index")]
    #[case(0, 4, "Invalid scene index")]
    #[case(2, 0, "Track is not a MIDI track")]
    #[case(0, 0, "Clip slot already has a clip")]
    fn creation_preconditions(
        mut host: SimulatedHost,
        #[case] track_index: i64,
        #[case] clip_index: i64,
        #[case] expected: &str,
    ) {
        let error = create_midi_clip(
            &mut host,
            CreateMidiClip {
                track_index,
                clip_index,
                length: DEFAULT_CLIP_LENGTH,
            },
        )
        .expect_err("precondition fails");
        assert_eq!(error.to_string(), expected);
        assert!(!error.is_fault());
    }

    #[rstest]
    fn clip_info_reflects_the_created_clip(mut host: SimulatedHost) {
        let info = get_clip_info(&mut host, at(0, 0)).expect("info");
        assert_eq!(info.get("length"), Some(&json!(8.0)));
        assert_eq!(info.get("loop_end"), Some(&json!(8.0)));
        assert_eq!(info.get("is_midi_clip"), Some(&json!(true)));
    }

    #[rstest]
    fn delete_requires_a_clip(mut host: SimulatedHost) {
        delete_clip(&mut host, at(0, 0)).expect("deleted");
        let error = delete_clip(&mut host, at(0, 0)).expect_err("already empty");
        assert_eq!(error.to_string(), NO_CLIP);
    }

    #[rstest]
    fn duplicate_targets_the_next_empty_slot(mut host: SimulatedHost) {
        let payload = duplicate_clip(&mut host, at(0, 0)).expect("duplicated");
        assert_eq!(payload.get("destination_clip_index"), Some(&json!(1)));
        let again = duplicate_clip(&mut host, at(0, 0)).expect("duplicated again");
        assert_eq!(again.get("destination_clip_index"), Some(&json!(2)));
    }

    #[rstest]
    fn duplicate_fails_without_room(mut host: SimulatedHost) {
        let mut last = SimulatedHost::demo();
        create_midi_clip(
            &mut last,
            CreateMidiClip {
                track_index: 0,
                clip_index: 3,
                length: 4.0,
            },
        )
        .expect("seed last slot");
        let error = duplicate_clip(&mut last, at(0, 3)).expect_err("no room");
        assert_eq!(error.to_string(), "No empty slot available after source slot");
        assert!(duplicate_clip(&mut host, at(0, 1)).is_err());
    }

    #[rstest]
    #[case(0, 4, INVALID_SCENE)]
    #[case(0, -1, INVALID_SCENE)]
    #[case(0, 2, NO_CLIP)]
    fn duplicate_rejects_bad_sources(
        mut host: SimulatedHost,
        #[case] track_index: i64,
        #[case] clip_index: i64,
        #[case] expected: &str,
    ) {
        let error = duplicate_clip(&mut host, at(track_index, clip_index)).expect_err("rejected");
        assert_eq!(error.to_string(), expected);
        assert!(!error.is_fault());
    }

    #[rstest]
    fn duplicate_copies_are_stopped(mut host: SimulatedHost) {
        launch_clip(&mut host, at(0, 0)).expect("launched");
        duplicate_clip(&mut host, at(0, 0)).expect("duplicated");
        let copy = get_clip_info(&mut host, at(0, 1)).expect("copy info");
        assert_eq!(copy.get("is_playing"), Some(&json!(false)));
        assert_eq!(copy.get("length"), Some(&json!(8.0)));
    }

    #[rstest]
    fn launch_and_stop(mut host: SimulatedHost) {
        let playing = |host: &mut SimulatedHost| {
            get_clip_info(host, at(0, 0))
                .expect("info")
                .get("is_playing")
                .cloned()
        };
        launch_clip(&mut host, at(0, 0)).expect("launched");
        assert_eq!(playing(&mut host), Some(json!(true)));
        stop_clip(&mut host, at(0, 0)).expect("stopped");
        assert_eq!(playing(&mut host), Some(json!(false)));
        assert!(launch_clip(&mut host, at(0, 1)).is_err());
    }

    #[rstest]
    fn rename_sets_the_clip_name(mut host: SimulatedHost) {
        set_clip_name(
            &mut host,
            SetClipName {
                track_index: 0,
                clip_index: 0,
                name: "Bassline".to_owned(),
            },
        )
        .expect("renamed");
        let info = get_clip_info(&mut host, at(0, 0)).expect("info");
        assert_eq!(info.get("name"), Some(&json!("Bassline")));
    }
}
