//! Tests for command resolution and failure normalisation.

use rstest::{fixture, rstest};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ActionError, CommandProcessor, DispatchTable, NoArguments, Payload};
use crate::host::{Host, HostError, SimulatedHost};
use crate::relay::{Command, Params};
use crate::script::{SCRIPT_NAME, VERSION};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Slot {
    track_index: usize,
    clip_index: usize,
}

fn echo(params: Params) -> Payload {
    let mut payload = Payload::new();
    payload.insert("received".to_owned(), Value::Object(params));
    payload
}

#[fixture]
fn processor() -> CommandProcessor<SimulatedHost> {
    let mut table = DispatchTable::new();
    table
        .register_raw("ping", |_host: &mut SimulatedHost, _params| {
            Err(ActionError::rejected("shadowed ping must be unreachable"))
        })
        .register_raw("delete_clip", |_host: &mut SimulatedHost, params| {
            Ok(echo(params))
        })
        .register_raw("launch_scene", |_host: &mut SimulatedHost, params| {
            Ok(echo(params))
        })
        .register("get_clip_info", |_host: &mut SimulatedHost, slot: Slot| {
            Err(ActionError::rejected(format!(
                "No clip in slot {}/{}",
                slot.track_index, slot.clip_index
            )))
        })
        .register("set_tempo", |host: &mut SimulatedHost, NoArguments {}| {
            Err(ActionError::from(HostError::call_failed(
                "tempo",
                format!("{} refused", host.song().tempo),
            )))
        })
        .register("explode", |_host: &mut SimulatedHost, NoArguments {}| {
            panic!("capability blew up")
        });
    CommandProcessor::new(table)
}

fn command(value: Value) -> Command {
    match value {
        Value::Object(fields) => Command::from_fields(fields),
        other => panic!("expected object, got {other}"),
    }
}

#[rstest]
fn ping_short_circuits_registered_actions(processor: CommandProcessor<SimulatedHost>) {
    let mut host = SimulatedHost::new();
    let response = processor.process(&mut host, command(json!({"action": "ping"})), 0);
    assert!(response.is_ok());
    assert_eq!(
        response.get("message"),
        Some(&json!("pong (queue-based, thread-safe)"))
    );
    assert_eq!(response.get("script"), Some(&json!(SCRIPT_NAME)));
    assert_eq!(response.get("version"), Some(&json!(VERSION)));
}

#[rstest]
fn health_check_reports_counts_and_host_version(processor: CommandProcessor<SimulatedHost>) {
    let mut host = SimulatedHost::new();
    let response = processor.process(&mut host, command(json!({"action": "health_check"})), 3);
    assert!(response.is_ok());
    assert_eq!(response.get("queue_size"), Some(&json!(3)));
    assert_eq!(
        response.get("ableton_version"),
        Some(&json!(SimulatedHost::DEFAULT_VERSION))
    );
    assert_eq!(
        response.get("tool_count"),
        Some(&json!(processor.available_actions().len()))
    );
}

#[rstest]
fn health_check_host_failure_is_a_fault(processor: CommandProcessor<SimulatedHost>) {
    let mut host =
        SimulatedHost::new().with_version_error(HostError::call_failed("version", "offline"));
    let response = processor.process(&mut host, command(json!({"action": "health_check"})), 0);
    assert!(!response.is_ok());
    assert!(response.error_message().is_some_and(|m| m.contains("offline")));
    assert!(response.get("traceback").is_some());
    assert!(
        host.log_lines()
            .iter()
            .any(|line| line.contains("ERROR processing command"))
    );
}

#[rstest]
#[case(json!({"action": "does_not_exist"}), "Unknown action: does_not_exist")]
#[case(json!({"track_index": 1}), "Unknown action: ")]
#[case(json!({"action": 12}), "Unknown action: ")]
fn unknown_actions_list_what_is_available(
    processor: CommandProcessor<SimulatedHost>,
    #[case] request: Value,
    #[case] expected: &str,
) {
    let mut host = SimulatedHost::new();
    let response = processor.process(&mut host, command(request), 0);
    assert!(!response.is_ok());
    assert_eq!(response.error_message(), Some(expected));
    let available = response
        .get("available_actions")
        .and_then(Value::as_array)
        .expect("available actions listed");
    let names: Vec<&str> = available.iter().filter_map(Value::as_str).collect();
    assert!(names.contains(&"ping"));
    assert!(names.contains(&"health_check"));
    assert!(names.contains(&"delete_clip"));
    assert!(names.windows(2).all(|pair| pair[0] < pair[1]), "sorted and unique");
}

#[rstest]
fn legacy_slot_key_is_rewritten_for_clip_actions(processor: CommandProcessor<SimulatedHost>) {
    let mut host = SimulatedHost::new();
    let legacy = processor.process(
        &mut host,
        command(json!({"action": "delete_clip", "track_index": 0, "scene_index": 2})),
        0,
    );
    let canonical = processor.process(
        &mut host,
        command(json!({"action": "delete_clip", "track_index": 0, "clip_index": 2})),
        0,
    );
    assert_eq!(legacy, canonical);
    assert_eq!(
        legacy.get("received"),
        Some(&json!({"track_index": 0, "clip_index": 2}))
    );
}

#[rstest]
fn scene_actions_keep_scene_index(processor: CommandProcessor<SimulatedHost>) {
    let mut host = SimulatedHost::new();
    let response = processor.process(
        &mut host,
        command(json!({"action": "launch_scene", "scene_index": 1})),
        0,
    );
    assert_eq!(response.get("received"), Some(&json!({"scene_index": 1})));
}

#[rstest]
fn rejections_carry_no_traceback(processor: CommandProcessor<SimulatedHost>) {
    let mut host = SimulatedHost::new();
    let response = processor.process(
        &mut host,
        command(json!({"action": "get_clip_info", "track_index": 1, "scene_index": 0})),
        0,
    );
    assert_eq!(response.error_message(), Some("No clip in slot 1/0"));
    assert!(response.get("traceback").is_none());
    assert!(host.log_lines().is_empty());
}

#[rstest]
#[case(json!({"action": "get_clip_info", "track_index": 0, "clip_index": 0, "bogus": 1}))]
#[case(json!({"action": "get_clip_info", "track_index": 0}))]
#[case(json!({"action": "set_tempo"}))]
#[case(json!({"action": "explode"}))]
fn faults_carry_a_traceback(processor: CommandProcessor<SimulatedHost>, #[case] request: Value) {
    let mut host = SimulatedHost::new();
    let response = processor.process(&mut host, command(request), 0);
    assert!(!response.is_ok());
    assert!(response.error_message().is_some_and(|m| !m.is_empty()));
    let traceback = response
        .get("traceback")
        .and_then(Value::as_str)
        .expect("fault carries a traceback");
    assert!(!traceback.is_empty());
}

#[rstest]
fn panics_report_their_message(processor: CommandProcessor<SimulatedHost>) {
    let mut host = SimulatedHost::new();
    let response = processor.process(&mut host, command(json!({"action": "explode"})), 0);
    assert_eq!(response.error_message(), Some("capability blew up"));
}
