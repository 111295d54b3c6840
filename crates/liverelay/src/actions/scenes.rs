//! Scene actions. These address rows with `scene_index`, which is never
//! rewritten by the legacy alias table.

use serde::Deserialize;
use serde_json::json;

use super::common::{INVALID_SCENE, SceneAddress, insertion_point, object, position};
use crate::dispatch::{ActionError, ActionResult, DispatchTable};
use crate::host::Host;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateScene {
    #[serde(default)]
    index: Option<i64>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetSceneName {
    scene_index: i64,
    name: String,
}

pub(super) fn register<H: Host + 'static>(table: &mut DispatchTable<H>) {
    table
        .register("create_scene", create_scene::<H>)
        .register("delete_scene", delete_scene::<H>)
        .register("launch_scene", launch_scene::<H>)
        .register("get_scene_info", get_scene_info::<H>)
        .register("set_scene_name", set_scene_name::<H>);
}

fn create_scene<H: Host>(host: &mut H, args: CreateScene) -> ActionResult {
    let song = host.song_mut();
    let index = insertion_point(args.index, song.scenes().len(), INVALID_SCENE)?;
    let position = song.create_scene(index);
    let name = args.name.unwrap_or_default();
    if let Some(scene) = song.scene_mut(position) {
        scene.name.clone_from(&name);
    }
    Ok(object(json!({
        "message": "Scene created",
        "scene_index": position,
        "name": name,
    })))
}

fn delete_scene<H: Host>(host: &mut H, SceneAddress { scene_index }: SceneAddress) -> ActionResult {
    let song = host.song_mut();
    let index = position(scene_index, song.scenes().len(), INVALID_SCENE)?;
    song.delete_scene(index);
    Ok(object(json!({"message": "Scene deleted", "scene_index": index})))
}

fn launch_scene<H: Host>(host: &mut H, SceneAddress { scene_index }: SceneAddress) -> ActionResult {
    let song = host.song_mut();
    let index = position(scene_index, song.scenes().len(), INVALID_SCENE)?;
    let launched = song
        .fire_scene(index)
        .ok_or_else(|| ActionError::rejected(INVALID_SCENE))?;
    Ok(object(json!({
        "message": "Scene launched",
        "scene_index": index,
        "clips_launched": launched,
    })))
}

fn get_scene_info<H: Host>(
    host: &mut H,
    SceneAddress { scene_index }: SceneAddress,
) -> ActionResult {
    let song = host.song();
    let index = position(scene_index, song.scenes().len(), INVALID_SCENE)?;
    let scene = song
        .scene(index)
        .ok_or_else(|| ActionError::rejected(INVALID_SCENE))?;
    let clip_count = song
        .tracks()
        .iter()
        .filter(|track| track.clip_slots.get(index).is_some_and(|slot| slot.has_clip()))
        .count();
    Ok(object(json!({
        "scene_index": index,
        "name": scene.name,
        "tempo": scene.tempo,
        "clip_count": clip_count,
    })))
}

fn set_scene_name<H: Host>(host: &mut H, args: SetSceneName) -> ActionResult {
    let song = host.song_mut();
    let index = position(args.scene_index, song.scenes().len(), INVALID_SCENE)?;
    if let Some(scene) = song.scene_mut(index) {
        scene.name.clone_from(&args.name);
    }
    Ok(object(json!({"message": "Scene renamed", "name": args.name})))
}
