//! Channel-level tests against an in-memory audio backend.
//!
//! Tests verify:
//! 1. Built-in microphone is always listed first, names are unique
//! 2. Paired devices are listed only when permission is granted
//! 3. Selecting the built-in label disables wireless routing, anything else enables it
//! 4. Missing arguments and unknown methods never reach the backend
//! 5. Failed OS queries shrink the list instead of failing the call

use audio_device_control::platform::{AudioRouteBackend, DeviceControlError, WirelessDevices};
use audio_device_control::{DeviceControlChannel, DeviceControlConfig, MethodCall, MethodResponse};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct FakeState {
    wireless_routing: bool,
    route_calls: usize,
}

/// Stands in for the OS audio session
struct FakeBackend {
    paired: Vec<String>,
    permission_granted: bool,
    inputs: Vec<String>,
    /// Make `system_inputs` fail the way a thrown OS query does
    inputs_fail: bool,
    /// Make `paired_wireless_devices` fail
    paired_fail: bool,
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    fn new(paired: &[&str], permission_granted: bool, inputs: &[&str]) -> Self {
        Self {
            paired: paired.iter().map(|s| s.to_string()).collect(),
            permission_granted,
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            inputs_fail: false,
            paired_fail: false,
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }
}

impl AudioRouteBackend for FakeBackend {
    fn backend_name(&self) -> &'static str {
        "fake"
    }

    fn paired_wireless_devices(&self) -> Result<WirelessDevices, DeviceControlError> {
        if self.paired_fail {
            return Err(DeviceControlError::Platform("checkSelfPermission failed".to_string()));
        }
        if self.permission_granted {
            Ok(WirelessDevices::Listed(self.paired.clone()))
        } else {
            Ok(WirelessDevices::PermissionDenied)
        }
    }

    fn system_inputs(&self) -> Result<Vec<String>, DeviceControlError> {
        if self.inputs_fail {
            return Err(DeviceControlError::Platform("getDevices threw".to_string()));
        }
        Ok(self.inputs.clone())
    }

    fn release_external_route(&self) -> Result<(), DeviceControlError> {
        let mut state = self.state.lock().unwrap();
        state.wireless_routing = false;
        state.route_calls += 1;
        Ok(())
    }

    fn engage_external_route(&self, _name: &str) -> Result<(), DeviceControlError> {
        let mut state = self.state.lock().unwrap();
        state.wireless_routing = true;
        state.route_calls += 1;
        Ok(())
    }
}

fn setup(backend: FakeBackend) -> (DeviceControlChannel<FakeBackend>, Arc<Mutex<FakeState>>) {
    init_tracing();
    let state = backend.state.clone();
    (DeviceControlChannel::new(backend, DeviceControlConfig::default()), state)
}

fn list(channel: &DeviceControlChannel<FakeBackend>) -> Vec<String> {
    match channel.dispatch(&MethodCall::new("getInputDevices", Value::Null)) {
        MethodResponse::Success { result } => serde_json::from_value(result).unwrap(),
        other => panic!("expected device list, got {:?}", other),
    }
}

fn select(channel: &DeviceControlChannel<FakeBackend>, device: &str) -> MethodResponse {
    channel.dispatch(&MethodCall::new("setInputDevice", json!({ "device": device })))
}

#[test]
fn test_no_extra_devices() {
    let (channel, _) = setup(FakeBackend::new(&[], true, &[]));
    assert_eq!(list(&channel), vec!["Built-in Microphone"]);
}

#[test]
fn test_paired_device_listed() {
    let (channel, _) = setup(FakeBackend::new(&["Car Kit"], true, &[]));
    assert_eq!(list(&channel), vec!["Built-in Microphone", "Car Kit"]);
}

#[test]
fn test_paired_device_hidden_without_permission() {
    let (channel, _) = setup(FakeBackend::new(&["Car Kit"], false, &["Wired Headset"]));
    assert_eq!(list(&channel), vec!["Built-in Microphone", "Wired Headset"]);
}

#[test]
fn test_failed_input_query_still_lists_devices() {
    let mut backend = FakeBackend::new(&["Car Kit"], true, &["USB Audio"]);
    backend.inputs_fail = true;
    let (channel, _) = setup(backend);
    assert_eq!(list(&channel), vec!["Built-in Microphone", "Car Kit"]);
}

#[test]
fn test_every_query_failing_still_lists_builtin() {
    let mut backend = FakeBackend::new(&["Car Kit"], true, &["USB Audio"]);
    backend.inputs_fail = true;
    backend.paired_fail = true;
    let (channel, _) = setup(backend);
    assert_eq!(list(&channel), vec!["Built-in Microphone"]);
}

#[test]
fn test_builtin_first_and_unique() {
    let (channel, _) = setup(FakeBackend::new(
        &["Car Kit", "Earbuds", "Car Kit"],
        true,
        &["Earbuds", "Built-in Microphone", "USB Audio", "Car Kit"],
    ));
    let names = list(&channel);

    assert_eq!(names[0], "Built-in Microphone");
    let mut deduped = names.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), names.len());
    assert_eq!(names, vec!["Built-in Microphone", "Car Kit", "Earbuds", "USB Audio"]);
}

#[test]
fn test_select_builtin_disables_wireless() {
    let (channel, state) = setup(FakeBackend::new(&["Car Kit"], true, &[]));
    state.lock().unwrap().wireless_routing = true;

    assert_eq!(select(&channel, "Built-in Microphone"), MethodResponse::success(Value::Null));
    assert!(!state.lock().unwrap().wireless_routing);
}

#[test]
fn test_select_other_enables_wireless() {
    let (channel, state) = setup(FakeBackend::new(&["Car Kit"], true, &[]));

    assert_eq!(select(&channel, "Car Kit"), MethodResponse::success(Value::Null));
    assert!(state.lock().unwrap().wireless_routing);

    select(&channel, "Built-in Microphone");
    // Wired devices take the same external route
    select(&channel, "Wired Headset");
    assert!(state.lock().unwrap().wireless_routing);
}

#[test]
fn test_missing_device_is_invalid_argument() {
    let (channel, state) = setup(FakeBackend::new(&[], true, &[]));

    for arguments in [json!({}), Value::Null, json!(["Car Kit"])] {
        let response = channel.dispatch(&MethodCall::new("setInputDevice", arguments));
        assert_eq!(
            response,
            MethodResponse::Error {
                code: "INVALID_ARGUMENT".to_string(),
                message: "Device name not provided".to_string(),
                details: None,
            }
        );
    }
    assert_eq!(state.lock().unwrap().route_calls, 0);
}

#[test]
fn test_unknown_method_not_implemented() {
    let (channel, state) = setup(FakeBackend::new(&[], true, &[]));

    let response = channel.dispatch(&MethodCall::new("getOutputDevices", json!({ "device": "x" })));
    assert_eq!(
        response,
        MethodResponse::NotImplemented {
            method: "getOutputDevices".to_string()
        }
    );
    assert_eq!(state.lock().unwrap().route_calls, 0);
    assert!(!state.lock().unwrap().wireless_routing);
}

#[test]
fn test_wire_call_from_json() {
    let (channel, state) = setup(FakeBackend::new(&[], true, &[]));

    let call: MethodCall =
        serde_json::from_str(r#"{"method":"setInputDevice","arguments":{"device":"Car Kit"}}"#).unwrap();
    assert!(channel.dispatch(&call).is_success());
    assert!(state.lock().unwrap().wireless_routing);
    assert_eq!(channel.name(), "audio.device.control");
}

#[tokio::test]
async fn test_dispatch_blocking_lists_devices() {
    let (channel, _) = setup(FakeBackend::new(&["Car Kit"], true, &[]));
    let channel = Arc::new(channel);

    let response = channel
        .dispatch_blocking(MethodCall::new("getInputDevices", Value::Null))
        .await;
    assert_eq!(
        response,
        MethodResponse::success(json!(["Built-in Microphone", "Car Kit"]))
    );
}
