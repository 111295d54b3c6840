//! Index validation and payload helpers shared by the action handlers.
//!
//! Clients send indices as plain JSON integers, so handlers accept `i64` and
//! reject negative or out-of-range values with a routine error instead of a
//! binding fault.

use serde::Deserialize;
use serde_json::Value;

use crate::dispatch::{ActionError, Payload};
use crate::song::{Clip, ClipSlot, Song, Track};

pub(crate) const INVALID_TRACK: &str = "Invalid track index";
pub(crate) const INVALID_SCENE: &str = "Invalid scene index";
pub(crate) const INVALID_CLIP: &str = "Invalid clip index";
pub(crate) const NO_CLIP: &str = "No clip in slot";
pub(crate) const SLOT_OCCUPIED: &str = "Clip slot already has a clip";
pub(crate) const NOT_MIDI_TRACK: &str = "Track is not a MIDI track";
pub(crate) const NOT_MIDI_CLIP: &str = "Clip is not a MIDI clip";

/// Track and clip-slot coordinates.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SlotAddress {
    pub(crate) track_index: i64,
    pub(crate) clip_index: i64,
}

/// A single scene coordinate.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SceneAddress {
    pub(crate) scene_index: i64,
}

/// A single track coordinate.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TrackAddress {
    pub(crate) track_index: i64,
}

/// Converts a `json!` object literal into a payload.
pub(crate) fn object(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => {
            let mut payload = Payload::new();
            payload.insert("value".to_owned(), other);
            payload
        }
    }
}

/// `index` as a position inside `0..len`.
pub(crate) fn position(index: i64, len: usize, message: &str) -> Result<usize, ActionError> {
    usize::try_from(index)
        .ok()
        .filter(|position| *position < len)
        .ok_or_else(|| ActionError::rejected(message))
}

/// Insertion point for create actions: `None` or `-1` appends, otherwise the
/// index must lie inside `0..=len`.
pub(crate) fn insertion_point(
    index: Option<i64>,
    len: usize,
    message: &str,
) -> Result<Option<usize>, ActionError> {
    match index {
        None | Some(-1) => Ok(None),
        Some(index) => usize::try_from(index)
            .ok()
            .filter(|position| *position <= len)
            .map(Some)
            .ok_or_else(|| ActionError::rejected(message)),
    }
}

pub(crate) fn track(song: &Song, index: i64) -> Result<&Track, ActionError> {
    let position = position(index, song.tracks().len(), INVALID_TRACK)?;
    song.track(position)
        .ok_or_else(|| ActionError::rejected(INVALID_TRACK))
}

pub(crate) fn track_mut(song: &mut Song, index: i64) -> Result<&mut Track, ActionError> {
    let position = position(index, song.tracks().len(), INVALID_TRACK)?;
    song.track_mut(position)
        .ok_or_else(|| ActionError::rejected(INVALID_TRACK))
}

pub(crate) fn slot<'a>(
    track: &'a Track,
    index: i64,
    message: &str,
) -> Result<&'a ClipSlot, ActionError> {
    let position = position(index, track.clip_slots.len(), message)?;
    track
        .clip_slots
        .get(position)
        .ok_or_else(|| ActionError::rejected(message))
}

pub(crate) fn slot_mut<'a>(
    track: &'a mut Track,
    index: i64,
    message: &str,
) -> Result<&'a mut ClipSlot, ActionError> {
    let position = position(index, track.clip_slots.len(), message)?;
    track
        .clip_slots
        .get_mut(position)
        .ok_or_else(|| ActionError::rejected(message))
}

/// The clip at `address`, with the clip-slot action error messages.
pub(crate) fn clip(song: &Song, address: SlotAddress) -> Result<&Clip, ActionError> {
    let track = track(song, address.track_index)?;
    slot(track, address.clip_index, INVALID_SCENE)?
        .clip
        .as_ref()
        .ok_or_else(|| ActionError::rejected(NO_CLIP))
}

/// Mutable variant of [`clip`].
pub(crate) fn clip_mut(song: &mut Song, address: SlotAddress) -> Result<&mut Clip, ActionError> {
    let track = track_mut(song, address.track_index)?;
    slot_mut(track, address.clip_index, INVALID_SCENE)?
        .clip
        .as_mut()
        .ok_or_else(|| ActionError::rejected(NO_CLIP))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(-1, 3, None)]
    #[case(0, 3, Some(0))]
    #[case(2, 3, Some(2))]
    #[case(3, 3, None)]
    #[case(0, 0, None)]
    fn positions_must_fall_inside_the_range(
        #[case] index: i64,
        #[case] len: usize,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(position(index, len, INVALID_TRACK).ok(), expected);
    }

    #[rstest]
    #[case(None, Some(None))]
    #[case(Some(-1), Some(None))]
    #[case(Some(2), Some(Some(2)))]
    #[case(Some(3), None)]
    #[case(Some(-2), None)]
    fn insertion_points_allow_appending(
        #[case] index: Option<i64>,
        #[case] expected: Option<Option<usize>>,
    ) {
        assert_eq!(insertion_point(index, 2, INVALID_TRACK).ok(), expected);
    }
}
