//! Legacy parameter names accepted for clip-slot actions.
//!
//! Older clients addressed clip slots with `scene_index`. Clip-slot actions
//! take `clip_index`; scene actions keep `scene_index` and are not listed.

use crate::relay::Params;

/// `(action, legacy key, canonical key)` triples.
const PARAMETER_ALIASES: &[(&str, &str, &str)] = &[
    ("create_midi_clip", "scene_index", "clip_index"),
    ("delete_clip", "scene_index", "clip_index"),
    ("duplicate_clip", "scene_index", "clip_index"),
    ("launch_clip", "scene_index", "clip_index"),
    ("stop_clip", "scene_index", "clip_index"),
    ("get_clip_info", "scene_index", "clip_index"),
    ("set_clip_name", "scene_index", "clip_index"),
    ("add_notes", "scene_index", "clip_index"),
];

/// Renames legacy keys for `action` in place.
///
/// When both the legacy and the canonical key are present the canonical value
/// is kept and the legacy one is discarded.
pub fn canonicalise(action: &str, params: &mut Params) {
    for (_, legacy, canonical) in PARAMETER_ALIASES
        .iter()
        .filter(|(aliased, _, _)| *aliased == action)
    {
        if let Some(value) = params.remove(*legacy) {
            if !params.contains_key(*canonical) {
                params.insert((*canonical).to_owned(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[rstest]
    fn legacy_key_is_renamed_for_clip_actions() {
        let mut legacy = params(json!({"track_index": 0, "scene_index": 2}));
        canonicalise("delete_clip", &mut legacy);
        assert_eq!(legacy, params(json!({"track_index": 0, "clip_index": 2})));
    }

    #[rstest]
    fn canonical_key_wins() {
        let mut both = params(json!({"clip_index": 1, "scene_index": 3}));
        canonicalise("launch_clip", &mut both);
        assert_eq!(both, params(json!({"clip_index": 1})));
    }

    #[rstest]
    #[case("launch_scene")]
    #[case("delete_scene")]
    #[case("get_scene_info")]
    fn scene_actions_are_untouched(#[case] action: &str) {
        let mut scene = params(json!({"scene_index": 2}));
        canonicalise(action, &mut scene);
        assert_eq!(scene, params(json!({"scene_index": 2})));
    }
}
