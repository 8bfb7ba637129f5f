//! Method-call dispatch for the `audio.device.control` channel.
//!
//! The application layer sends `{ method, arguments }` and gets back a
//! tagged response: success with a value, a structured error, or
//! not-implemented for unknown methods.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::config::DeviceControlConfig;
use crate::platform::audio::{AudioRouteBackend, DeviceControlError};
use crate::service::DeviceControlService;

pub const METHOD_GET_INPUT_DEVICES: &str = "getInputDevices";
pub const METHOD_SET_INPUT_DEVICE: &str = "setInputDevice";

/// Incoming call on the channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// String argument `key`, if the arguments are a map holding a string there
    pub fn string_argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

/// Reply sent back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResponse {
    Success {
        result: Value,
    },
    Error {
        code: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
    NotImplemented {
        method: String,
    },
}

impl MethodResponse {
    pub fn success(result: Value) -> Self {
        Self::Success { result }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<DeviceControlError> for MethodResponse {
    fn from(err: DeviceControlError) -> Self {
        match err {
            DeviceControlError::NotImplemented(method) => Self::NotImplemented { method },
            other => Self::Error {
                code: other.code().to_string(),
                message: other.to_string(),
                details: None,
            },
        }
    }
}

/// Named channel routing method calls to a [`DeviceControlService`]
pub struct DeviceControlChannel<B: AudioRouteBackend> {
    service: DeviceControlService<B>,
}

impl<B: AudioRouteBackend> DeviceControlChannel<B> {
    pub fn new(backend: B, config: DeviceControlConfig) -> Self {
        Self {
            service: DeviceControlService::new(backend, config),
        }
    }

    /// Channel name the application layer addresses
    pub fn name(&self) -> &str {
        &self.service.config().channel
    }

    pub fn service(&self) -> &DeviceControlService<B> {
        &self.service
    }

    /// Handle one call on the current thread
    pub fn dispatch(&self, call: &MethodCall) -> MethodResponse {
        tracing::debug!("{} <- {}", self.name(), call.method);

        match self.handle(call) {
            Ok(result) => MethodResponse::success(result),
            Err(err) => err.into(),
        }
    }

    fn handle(&self, call: &MethodCall) -> Result<Value, DeviceControlError> {
        match call.method.as_str() {
            METHOD_GET_INPUT_DEVICES => {
                let listed = self.service.list_input_devices();
                Ok(Value::from(listed.names()))
            }
            METHOD_SET_INPUT_DEVICE => {
                let device = call.string_argument("device").ok_or_else(|| {
                    DeviceControlError::InvalidArgument("Device name not provided".to_string())
                })?;
                self.service.select_input_device(device)?;
                Ok(Value::Null)
            }
            other => Err(DeviceControlError::NotImplemented(other.to_string())),
        }
    }
}

impl<B: AudioRouteBackend + 'static> DeviceControlChannel<B> {
    /// Handle one call on tokio's blocking pool; OS audio calls may block
    pub async fn dispatch_blocking(self: Arc<Self>, call: MethodCall) -> MethodResponse {
        tokio::task::spawn_blocking(move || self.dispatch(&call))
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Device control task failed: {}", e);
                DeviceControlError::Platform(format!("Device control task failed: {}", e)).into()
            })
    }
}
