//! Tauri plugin exposing the device control channel.
//!
//! Register with `.plugin(audio_device_control::plugin::init())` and grant
//! `audio-device-control:default` in the app capabilities. On Android the
//! host must hand the JavaVM to `platform::audio::android::init_jvm` first.

use serde_json::Value;
use std::sync::Arc;
use tauri::plugin::{Builder, TauriPlugin};
use tauri::{Manager, Runtime, State};

use crate::channel::{
    DeviceControlChannel, MethodCall, MethodResponse, METHOD_GET_INPUT_DEVICES, METHOD_SET_INPUT_DEVICE,
};
use crate::config::DeviceControlConfig;
use crate::platform::audio::{platform_backend, AudioRouteBackend};

pub const PLUGIN_NAME: &str = "audio-device-control";

/// Channel shared through Tauri managed state
pub type SharedDeviceControl = Arc<DeviceControlChannel<Box<dyn AudioRouteBackend>>>;

fn into_result(response: MethodResponse) -> Result<Value, String> {
    match response {
        MethodResponse::Success { result } => Ok(result),
        MethodResponse::Error { code, message, .. } => Err(format!("{}: {}", code, message)),
        MethodResponse::NotImplemented { method } => Err(format!("Method not implemented: {}", method)),
    }
}

/// List input device names, built-in microphone first
#[tauri::command]
async fn get_input_devices(state: State<'_, SharedDeviceControl>) -> Result<Vec<String>, String> {
    let call = MethodCall::new(METHOD_GET_INPUT_DEVICES, Value::Null);
    let result = into_result(state.inner().clone().dispatch_blocking(call).await)?;
    serde_json::from_value(result).map_err(|e| e.to_string())
}

/// Select an input device by name
#[tauri::command]
async fn set_input_device(
    device: Option<String>,
    state: State<'_, SharedDeviceControl>,
) -> Result<(), String> {
    let arguments = match device {
        Some(device) => serde_json::json!({ "device": device }),
        None => Value::Null,
    };
    let call = MethodCall::new(METHOD_SET_INPUT_DEVICE, arguments);
    into_result(state.inner().clone().dispatch_blocking(call).await).map(|_| ())
}

/// Raw channel access, returning the tagged response unchanged
#[tauri::command]
async fn invoke_method(
    method: String,
    arguments: Option<Value>,
    state: State<'_, SharedDeviceControl>,
) -> Result<MethodResponse, String> {
    let call = MethodCall::new(method, arguments.unwrap_or(Value::Null));
    Ok(state.inner().clone().dispatch_blocking(call).await)
}

/// Build the plugin. Config comes from `plugins.audio-device-control`.
pub fn init<R: Runtime>() -> TauriPlugin<R, Option<DeviceControlConfig>> {
    Builder::<R, Option<DeviceControlConfig>>::new(PLUGIN_NAME)
        .invoke_handler(tauri::generate_handler![
            get_input_devices,
            set_input_device,
            invoke_method,
        ])
        .setup(|app, api| {
            let config = api.config().clone().unwrap_or_default();
            let backend = platform_backend();
            tracing::info!(
                "Audio device control '{}' using {} backend",
                config.channel,
                backend.backend_name()
            );

            let channel: SharedDeviceControl = Arc::new(DeviceControlChannel::new(backend, config));
            app.manage(channel);
            Ok(())
        })
        .build()
}
