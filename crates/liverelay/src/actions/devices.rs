//! Device-chain actions: add, list, inspect, switch, tweak and delete.
//!
//! Parameters are addressed either by position or by display name. Values
//! outside a parameter's range are rejected rather than clamped.

use serde::Deserialize;
use serde_json::{Value, json};

use super::common::{TrackAddress, object, position, track, track_mut};
use crate::dispatch::{ActionError, ActionResult, DispatchTable};
use crate::host::Host;
use crate::song::{Device, DeviceParameter, Track};

const INVALID_DEVICE: &str = "Invalid device index";
const INVALID_PARAMETER: &str = "Invalid parameter index";
const VALUE_OUT_OF_RANGE: &str = "Parameter value out of range";
const PARAMETER_DISABLED: &str = "Parameter is disabled";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AddDevice {
    track_index: i64,
    device_name: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeviceAddress {
    track_index: i64,
    device_index: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetDeviceParam {
    track_index: i64,
    device_index: i64,
    param_index: i64,
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetDeviceOnOff {
    track_index: i64,
    device_index: i64,
    enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterByName {
    track_index: i64,
    device_index: i64,
    param_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetParameterByName {
    track_index: i64,
    device_index: i64,
    param_name: String,
    value: f64,
}

pub(super) fn register<H: Host + 'static>(table: &mut DispatchTable<H>) {
    table
        .register("add_device", add_device::<H>)
        .register("get_track_devices", get_track_devices::<H>)
        .register("get_device_parameters", get_device_parameters::<H>)
        .register("get_device_parameter_by_name", get_parameter_by_name::<H>)
        .register("set_device_param", set_device_param::<H>)
        .register("set_device_parameter_by_name", set_parameter_by_name::<H>)
        .register("set_device_on_off", set_device_on_off::<H>)
        .register("delete_device", delete_device::<H>);
}

fn device(track: &Track, index: i64) -> Result<&Device, ActionError> {
    let position = position(index, track.devices.len(), INVALID_DEVICE)?;
    track
        .devices
        .get(position)
        .ok_or_else(|| ActionError::rejected(INVALID_DEVICE))
}

fn device_mut(track: &mut Track, index: i64) -> Result<&mut Device, ActionError> {
    let position = position(index, track.devices.len(), INVALID_DEVICE)?;
    track
        .devices
        .get_mut(position)
        .ok_or_else(|| ActionError::rejected(INVALID_DEVICE))
}

fn not_found(name: &str) -> ActionError {
    ActionError::rejected(format!("Parameter '{name}' not found"))
}

fn assign(parameter: &mut DeviceParameter, value: f64) -> Result<(), ActionError> {
    if !parameter.is_enabled {
        return Err(ActionError::rejected(PARAMETER_DISABLED));
    }
    if !parameter.set(value) {
        return Err(ActionError::rejected(VALUE_OUT_OF_RANGE));
    }
    Ok(())
}

fn describe(index: usize, parameter: &DeviceParameter) -> Value {
    json!({
        "index": index,
        "name": parameter.name,
        "value": parameter.value,
        "min": parameter.min,
        "max": parameter.max,
        "is_quantized": parameter.is_quantized,
        "is_enabled": parameter.is_enabled,
    })
}

fn add_device<H: Host>(host: &mut H, args: AddDevice) -> ActionResult {
    let track = track_mut(host.song_mut(), args.track_index)?;
    let class_name: String = args.device_name.split_whitespace().collect();
    let device_index = track.devices.len();
    track.devices.push(Device::new(&args.device_name, &class_name));
    Ok(object(json!({
        "message": "Device added",
        "device_name": args.device_name,
        "device_index": device_index,
    })))
}

fn get_track_devices<H: Host>(
    host: &mut H,
    TrackAddress { track_index }: TrackAddress,
) -> ActionResult {
    let track = track(host.song(), track_index)?;
    let devices: Vec<_> = track
        .devices
        .iter()
        .map(|device| {
            json!({
                "name": device.name,
                "class_name": device.class_name,
                "is_active": device.is_active,
                "num_parameters": device.parameters.len(),
            })
        })
        .collect();
    Ok(object(json!({
        "track_index": track_index,
        "count": devices.len(),
        "devices": devices,
    })))
}

fn get_device_parameters<H: Host>(host: &mut H, address: DeviceAddress) -> ActionResult {
    let track = track(host.song(), address.track_index)?;
    let device = device(track, address.device_index)?;
    let parameters: Vec<_> = device
        .parameters
        .iter()
        .enumerate()
        .map(|(index, parameter)| describe(index, parameter))
        .collect();
    Ok(object(json!({
        "track_index": address.track_index,
        "device_index": address.device_index,
        "count": parameters.len(),
        "parameters": parameters,
    })))
}

fn get_parameter_by_name<H: Host>(host: &mut H, args: ParameterByName) -> ActionResult {
    let track = track(host.song(), args.track_index)?;
    let device = device(track, args.device_index)?;
    device
        .parameters
        .iter()
        .enumerate()
        .find(|(_, parameter)| parameter.name == args.param_name)
        .map(|(index, parameter)| object(describe(index, parameter)))
        .ok_or_else(|| not_found(&args.param_name))
}

fn set_device_param<H: Host>(host: &mut H, args: SetDeviceParam) -> ActionResult {
    let track = track_mut(host.song_mut(), args.track_index)?;
    let device = device_mut(track, args.device_index)?;
    let index = position(args.param_index, device.parameters.len(), INVALID_PARAMETER)?;
    let parameter = device
        .parameters
        .get_mut(index)
        .ok_or_else(|| ActionError::rejected(INVALID_PARAMETER))?;
    assign(parameter, args.value)?;
    let value = parameter.value;
    if index == 0 {
        device.is_active = value > 0.0;
    }
    Ok(object(json!({"message": "Parameter set", "value": value})))
}

fn set_parameter_by_name<H: Host>(host: &mut H, args: SetParameterByName) -> ActionResult {
    let track = track_mut(host.song_mut(), args.track_index)?;
    let device = device_mut(track, args.device_index)?;
    let (index, parameter) = device
        .parameters
        .iter_mut()
        .enumerate()
        .find(|(_, parameter)| parameter.name == args.param_name)
        .ok_or_else(|| not_found(&args.param_name))?;
    assign(parameter, args.value)?;
    let value = parameter.value;
    if index == 0 {
        device.is_active = value > 0.0;
    }
    Ok(object(json!({"name": args.param_name, "value": value})))
}

fn set_device_on_off<H: Host>(host: &mut H, args: SetDeviceOnOff) -> ActionResult {
    let track = track_mut(host.song_mut(), args.track_index)?;
    let device = device_mut(track, args.device_index)?;
    device.set_active(args.enabled);
    Ok(object(json!({"is_active": device.is_active})))
}

fn delete_device<H: Host>(host: &mut H, address: DeviceAddress) -> ActionResult {
    let track = track_mut(host.song_mut(), address.track_index)?;
    let index = position(address.device_index, track.devices.len(), INVALID_DEVICE)?;
    track.devices.remove(index);
    Ok(object(json!({"message": "Device deleted"})))
}
