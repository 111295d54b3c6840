//! In-memory model of the host's session: tracks, clip slots, clips, device
//! chains, scenes and transport state.
//!
//! Every track owns one clip slot per scene, so the slot grid stays
//! rectangular as tracks and scenes are added or removed.

use serde::Serialize;

/// Slowest tempo the transport accepts, in BPM.
pub const MIN_TEMPO: f64 = 20.0;
/// Fastest tempo the transport accepts, in BPM.
pub const MAX_TEMPO: f64 = 999.0;

const DEFAULT_TEMPO: f64 = 120.0;

/// Kind of material a track carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    /// Track with MIDI input; clips hold notes.
    Midi,
    /// Track with audio input.
    Audio,
}

/// One MIDI note inside a clip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    /// MIDI pitch, 0–127.
    pub pitch: u8,
    /// Start position in beats from the clip start.
    pub start: f64,
    /// Length in beats; always positive.
    pub duration: f64,
    /// MIDI velocity, 0–127.
    pub velocity: u8,
    /// Whether the note is muted.
    pub mute: bool,
}

/// A clip occupying a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// Display name.
    pub name: String,
    /// Length in beats.
    pub length: f64,
    /// Loop start in beats.
    pub loop_start: f64,
    /// Loop end in beats.
    pub loop_end: f64,
    /// `true` for MIDI clips, `false` for audio clips.
    pub is_midi: bool,
    /// Whether the clip is currently playing.
    pub is_playing: bool,
    /// Whether the clip is muted.
    pub muted: bool,
    /// Optional RGB colour.
    pub color: Option<u32>,
    /// Notes, ordered by insertion.
    pub notes: Vec<Note>,
}

impl Clip {
    /// Creates an empty MIDI clip looping over its whole length.
    #[must_use]
    pub fn midi(length: f64) -> Self {
        Self {
            name: String::new(),
            length,
            loop_start: 0.0,
            loop_end: length,
            is_midi: true,
            is_playing: false,
            muted: false,
            color: None,
            notes: Vec::new(),
        }
    }
}

/// A cell of the session grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipSlot {
    /// Clip in the slot, if any.
    pub clip: Option<Clip>,
}

impl ClipSlot {
    /// Returns `true` when the slot holds a clip.
    #[must_use]
    pub const fn has_clip(&self) -> bool {
        self.clip.is_some()
    }
}

/// One automatable control on a device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceParameter {
    /// Display name.
    pub name: String,
    /// Current value, always inside `min..=max`.
    pub value: f64,
    /// Lowest accepted value.
    pub min: f64,
    /// Highest accepted value.
    pub max: f64,
    /// Whether the parameter only takes whole steps.
    pub is_quantized: bool,
    /// Whether the parameter can currently be changed.
    pub is_enabled: bool,
}

impl DeviceParameter {
    /// A continuous, enabled parameter.
    #[must_use]
    pub fn continuous(name: &str, value: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.to_owned(),
            value,
            min,
            max,
            is_quantized: false,
            is_enabled: true,
        }
    }

    /// Sets the value. Returns `false`, leaving the value unchanged, when
    /// `value` lies outside the parameter's range.
    pub fn set(&mut self, value: f64) -> bool {
        if !(self.min..=self.max).contains(&value) {
            return false;
        }
        self.value = value;
        true
    }
}

/// Name of the on/off switch every device carries as its first parameter.
pub const DEVICE_ON: &str = "Device On";

/// An instrument or effect in a track's device chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// Display name.
    pub name: String,
    /// Host class of the device, for example `AutoFilter`.
    pub class_name: String,
    /// Whether the device is switched on.
    pub is_active: bool,
    /// Parameters; the first is always the [`DEVICE_ON`] switch.
    pub parameters: Vec<DeviceParameter>,
}

impl Device {
    /// A switched-on device whose only parameter is the [`DEVICE_ON`] switch.
    #[must_use]
    pub fn new(name: &str, class_name: &str) -> Self {
        Self {
            name: name.to_owned(),
            class_name: class_name.to_owned(),
            is_active: true,
            parameters: vec![DeviceParameter {
                is_quantized: true,
                ..DeviceParameter::continuous(DEVICE_ON, 1.0, 0.0, 1.0)
            }],
        }
    }

    /// Appends `parameter` to the device.
    #[must_use]
    pub fn with_parameter(mut self, parameter: DeviceParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Switches the device and keeps the [`DEVICE_ON`] parameter in step.
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        if let Some(switch) = self.parameters.iter_mut().find(|param| param.name == DEVICE_ON) {
            switch.value = if active { 1.0 } else { 0.0 };
        }
    }
}

/// A session track.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Display name.
    pub name: String,
    /// MIDI or audio.
    pub kind: TrackKind,
    /// Whether the track is muted.
    pub mute: bool,
    /// Whether the track is soloed.
    pub solo: bool,
    /// Whether the track is armed for recording.
    pub arm: bool,
    /// One slot per scene.
    pub clip_slots: Vec<ClipSlot>,
    /// Device chain, in signal order.
    pub devices: Vec<Device>,
}

impl Track {
    fn new(name: String, kind: TrackKind, scene_count: usize) -> Self {
        Self {
            name,
            kind,
            mute: false,
            solo: false,
            arm: false,
            clip_slots: vec![ClipSlot::default(); scene_count],
            devices: Vec::new(),
        }
    }

    /// Returns `true` for tracks with MIDI input.
    #[must_use]
    pub fn has_midi_input(&self) -> bool {
        self.kind == TrackKind::Midi
    }

    fn stop_clips(&mut self) {
        for clip in self.clip_slots.iter_mut().filter_map(|slot| slot.clip.as_mut()) {
            clip.is_playing = false;
        }
    }

    /// Starts the clip at `slot_index` and stops every other clip on the
    /// track. Returns `false` when the slot is out of range or empty.
    pub fn fire(&mut self, slot_index: usize) -> bool {
        let has_clip = self
            .clip_slots
            .get(slot_index)
            .is_some_and(ClipSlot::has_clip);
        if !has_clip {
            return false;
        }
        self.stop_clips();
        if let Some(clip) = self
            .clip_slots
            .get_mut(slot_index)
            .and_then(|slot| slot.clip.as_mut())
        {
            clip.is_playing = true;
        }
        true
    }
}

/// A row of the session grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Display name.
    pub name: String,
    /// Tempo applied when the scene launches, if any.
    pub tempo: Option<f64>,
}

/// The session as seen through the host's scripting surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    /// Tempo in BPM.
    pub tempo: f64,
    /// Whether the transport is running.
    pub is_playing: bool,
    /// Time signature numerator.
    pub signature_numerator: u8,
    /// Time signature denominator.
    pub signature_denominator: u8,
    tracks: Vec<Track>,
    scenes: Vec<Scene>,
}

impl Default for Song {
    fn default() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            is_playing: false,
            signature_numerator: 4,
            signature_denominator: 4,
            tracks: Vec::new(),
            scenes: Vec::new(),
        }
    }
}

impl Song {
    /// Creates an empty song at the default tempo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session tracks, left to right.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Scenes, top to bottom.
    #[must_use]
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Track at `index`.
    #[must_use]
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Mutable track at `index`.
    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    /// Scene at `index`.
    #[must_use]
    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    /// Mutable scene at `index`.
    pub fn scene_mut(&mut self, index: usize) -> Option<&mut Scene> {
        self.scenes.get_mut(index)
    }

    /// Inserts a track at `index` (appends when `None` or past the end) and
    /// returns its final position.
    pub fn create_track(&mut self, kind: TrackKind, index: Option<usize>) -> usize {
        let position = index
            .filter(|index| *index <= self.tracks.len())
            .unwrap_or(self.tracks.len());
        let label = match kind {
            TrackKind::Midi => "MIDI",
            TrackKind::Audio => "Audio",
        };
        let name = format!("{} {label}", self.tracks.len() + 1);
        self.tracks
            .insert(position, Track::new(name, kind, self.scenes.len()));
        position
    }

    /// Inserts a scene at `index` (appends when `None` or past the end),
    /// adding an empty slot to every track. Returns its final position.
    pub fn create_scene(&mut self, index: Option<usize>) -> usize {
        let position = index
            .filter(|index| *index <= self.scenes.len())
            .unwrap_or(self.scenes.len());
        self.scenes.insert(
            position,
            Scene {
                name: String::new(),
                tempo: None,
            },
        );
        for track in &mut self.tracks {
            track.clip_slots.insert(position, ClipSlot::default());
        }
        position
    }

    /// Removes the scene at `index` together with its row of slots.
    /// Returns `false` when the index is out of range.
    pub fn delete_scene(&mut self, index: usize) -> bool {
        if index >= self.scenes.len() {
            return false;
        }
        self.scenes.remove(index);
        for track in &mut self.tracks {
            if index < track.clip_slots.len() {
                track.clip_slots.remove(index);
            }
        }
        true
    }

    /// Launches every clip in the scene's row and applies the scene tempo.
    /// Returns the number of clips started, or `None` for an invalid index.
    pub fn fire_scene(&mut self, index: usize) -> Option<usize> {
        let tempo = self.scenes.get(index)?.tempo;
        if let Some(tempo) = tempo {
            self.tempo = tempo;
        }
        let launched = self
            .tracks
            .iter_mut()
            .map(|track| track.fire(index))
            .filter(|fired| *fired)
            .count();
        self.is_playing = true;
        Some(launched)
    }

    /// Stops every playing clip.
    pub fn stop_all_clips(&mut self) {
        for track in &mut self.tracks {
            track.stop_clips();
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn grid(tracks: usize, scenes: usize) -> Song {
        let mut song = Song::new();
        for _ in 0..scenes {
            song.create_scene(None);
        }
        for _ in 0..tracks {
            song.create_track(TrackKind::Midi, None);
        }
        song
    }

    #[rstest]
    fn grid_stays_rectangular() {
        let mut song = grid(2, 3);
        assert!(song.tracks().iter().all(|track| track.clip_slots.len() == 3));
        song.create_scene(Some(0));
        assert!(song.tracks().iter().all(|track| track.clip_slots.len() == 4));
        assert!(song.delete_scene(1));
        assert!(song.tracks().iter().all(|track| track.clip_slots.len() == 3));
        assert!(!song.delete_scene(10));
    }

    #[rstest]
    fn firing_a_slot_stops_siblings() {
        let mut song = grid(1, 2);
        let track = song.track_mut(0).expect("track");
        track.clip_slots[0].clip = Some(Clip::midi(4.0));
        track.clip_slots[1].clip = Some(Clip::midi(4.0));
        assert!(track.fire(0));
        assert!(track.fire(1));
        let playing: Vec<bool> = track
            .clip_slots
            .iter()
            .map(|slot| slot.clip.as_ref().is_some_and(|clip| clip.is_playing))
            .collect();
        assert_eq!(playing, vec![false, true]);
        assert!(!track.fire(5));
    }

    #[rstest]
    fn firing_a_scene_applies_its_tempo() {
        let mut song = grid(2, 1);
        song.scene_mut(0).expect("scene").tempo = Some(90.0);
        song.track_mut(1).expect("track").clip_slots[0].clip = Some(Clip::midi(2.0));
        assert_eq!(song.fire_scene(0), Some(1));
        assert!((song.tempo - 90.0).abs() < f64::EPSILON);
        assert!(song.is_playing);
        assert_eq!(song.fire_scene(3), None);
    }

    #[rstest]
    fn parameters_reject_values_outside_their_range() {
        let mut cutoff = DeviceParameter::continuous("Frequency", 1_000.0, 20.0, 20_000.0);
        assert!(cutoff.set(440.0));
        assert!(!cutoff.set(25_000.0));
        assert!(!cutoff.set(f64::NAN));
        assert!((cutoff.value - 440.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn switching_a_device_moves_its_on_parameter() {
        let mut device = Device::new("Auto Filter", "AutoFilter");
        device.set_active(false);
        assert!(!device.is_active);
        assert_eq!(device.parameters.first().map(|param| param.value), Some(0.0));
        device.set_active(true);
        assert_eq!(device.parameters.first().map(|param| param.value), Some(1.0));
    }

    #[rstest]
    fn tracks_insert_at_requested_position() {
        let mut song = grid(2, 1);
        assert_eq!(song.create_track(TrackKind::Audio, Some(0)), 0);
        assert_eq!(song.track(0).map(|track| track.kind), Some(TrackKind::Audio));
        assert_eq!(song.create_track(TrackKind::Midi, Some(99)), 3);
    }
}
