//! MIDI note editing inside clips.

use serde::Deserialize;
use serde_json::json;

use super::common::{
    INVALID_CLIP, NO_CLIP, NOT_MIDI_CLIP, NOT_MIDI_TRACK, SlotAddress, object, slot, slot_mut,
    track, track_mut,
};
use crate::dispatch::{ActionError, ActionResult, DispatchTable};
use crate::host::Host;
use crate::song::{Clip, Note, Song};

const MIDI_MAX: f64 = 127.0;

/// One note as submitted by a client. Missing keys take the usual defaults
/// and unrecognised keys are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct NoteSpec {
    pitch: f64,
    start: f64,
    duration: f64,
    velocity: f64,
    mute: bool,
}

impl Default for NoteSpec {
    fn default() -> Self {
        Self {
            pitch: 60.0,
            start: 0.0,
            duration: 1.0,
            velocity: 100.0,
            mute: false,
        }
    }
}

impl NoteSpec {
    /// The note to write, or `None` when pitch, velocity or duration is out
    /// of range.
    fn to_note(&self) -> Option<Note> {
        let pitch = self.pitch.trunc();
        let velocity = self.velocity.trunc();
        let in_range = |value: f64| (0.0..=MIDI_MAX).contains(&value);
        if !in_range(pitch) || !in_range(velocity) || self.duration <= 0.0 {
            return None;
        }
        Some(Note {
            pitch: midi_byte(pitch),
            start: self.start,
            duration: self.duration,
            velocity: midi_byte(velocity),
            mute: self.mute,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AddNotes {
    track_index: i64,
    clip_index: i64,
    notes: Vec<NoteSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RemoveNotes {
    track_index: i64,
    clip_index: i64,
    #[serde(default)]
    pitch_from: i64,
    #[serde(default = "default_pitch_to")]
    pitch_to: i64,
    #[serde(default)]
    time_from: f64,
    #[serde(default = "default_time_to")]
    time_to: f64,
}

const fn default_pitch_to() -> i64 {
    127
}

const fn default_time_to() -> f64 {
    999.0
}

pub(super) fn register<H: Host + 'static>(table: &mut DispatchTable<H>) {
    table
        .register("add_notes", add_notes::<H>)
        .register("get_clip_notes", get_clip_notes::<H>)
        .register("remove_notes", remove_notes::<H>);
}

// Callers have already checked the value lies in 0..=127.
fn midi_byte(value: f64) -> u8 {
    value as u8
}

fn midi_clip(song: &Song, address: SlotAddress) -> Result<&Clip, ActionError> {
    let track = track(song, address.track_index)?;
    if !track.has_midi_input() {
        return Err(ActionError::rejected(NOT_MIDI_TRACK));
    }
    let clip = slot(track, address.clip_index, INVALID_CLIP)?
        .clip
        .as_ref()
        .ok_or_else(|| ActionError::rejected(NO_CLIP))?;
    if clip.is_midi {
        Ok(clip)
    } else {
        Err(ActionError::rejected(NOT_MIDI_CLIP))
    }
}

fn midi_clip_mut(song: &mut Song, address: SlotAddress) -> Result<&mut Clip, ActionError> {
    let track = track_mut(song, address.track_index)?;
    if !track.has_midi_input() {
        return Err(ActionError::rejected(NOT_MIDI_TRACK));
    }
    let clip = slot_mut(track, address.clip_index, INVALID_CLIP)?
        .clip
        .as_mut()
        .ok_or_else(|| ActionError::rejected(NO_CLIP))?;
    if clip.is_midi {
        Ok(clip)
    } else {
        Err(ActionError::rejected(NOT_MIDI_CLIP))
    }
}

fn add_notes<H: Host>(host: &mut H, args: AddNotes) -> ActionResult {
    let address = SlotAddress {
        track_index: args.track_index,
        clip_index: args.clip_index,
    };
    let clip = midi_clip_mut(host.song_mut(), address)?;
    clip.notes
        .extend(args.notes.iter().filter_map(NoteSpec::to_note));
    Ok(object(json!({
        "message": "Notes added",
        "track_index": args.track_index,
        "clip_index": args.clip_index,
        "note_count": args.notes.len(),
    })))
}

fn get_clip_notes<H: Host>(host: &mut H, address: SlotAddress) -> ActionResult {
    let clip = midi_clip(host.song(), address)?;
    let mut notes: Vec<&Note> = clip.notes.iter().collect();
    notes.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.pitch.cmp(&b.pitch)));
    let notes: Vec<_> = notes
        .into_iter()
        .map(|note| {
            json!({
                "pitch": note.pitch,
                "start_time": note.start,
                "duration": note.duration,
                "velocity": note.velocity,
                "muted": note.mute,
            })
        })
        .collect();
    Ok(object(json!({
        "track_index": address.track_index,
        "clip_index": address.clip_index,
        "count": notes.len(),
        "notes": notes,
    })))
}

fn remove_notes<H: Host>(host: &mut H, args: RemoveNotes) -> ActionResult {
    let address = SlotAddress {
        track_index: args.track_index,
        clip_index: args.clip_index,
    };
    let clip = midi_clip_mut(host.song_mut(), address)?;
    let before = clip.notes.len();
    clip.notes.retain(|note| {
        let pitch = i64::from(note.pitch);
        let pitch_hit = (args.pitch_from..=args.pitch_to).contains(&pitch);
        let time_hit = note.start >= args.time_from && note.start < args.time_to;
        !(pitch_hit && time_hit)
    });
    Ok(object(json!({
        "message": "Notes removed",
        "removed": before - clip.notes.len(),
    })))
}
