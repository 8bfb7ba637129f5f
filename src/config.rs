//! Channel configuration.
//!
//! Read from `plugins.audio-device-control` in `tauri.conf.json` when the
//! Tauri plugin is enabled, or from any JSON document via [`DeviceControlConfig::from_json`].

use serde::{Deserialize, Serialize};

use crate::platform::audio::DeviceControlError;

/// Channel name shared with the application layer
pub const CHANNEL_NAME: &str = "audio.device.control";

/// Label of the built-in microphone sentinel
pub const BUILT_IN_MICROPHONE: &str = "Built-in Microphone";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceControlConfig {
    /// Name of the method channel
    pub channel: String,
    /// Label used for the default built-in microphone
    pub built_in_label: String,
    /// Scan bonded wireless devices during enumeration
    pub include_paired_wireless: bool,
    /// Include the other input endpoints reported by the OS
    pub include_system_inputs: bool,
}

impl Default for DeviceControlConfig {
    fn default() -> Self {
        Self {
            channel: CHANNEL_NAME.to_string(),
            built_in_label: BUILT_IN_MICROPHONE.to_string(),
            include_paired_wireless: true,
            include_system_inputs: true,
        }
    }
}

impl DeviceControlConfig {
    /// Parse a JSON config document. Missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, DeviceControlError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| DeviceControlError::InvalidArgument(format!("Invalid config: {}", e)))?;

        if config.built_in_label.trim().is_empty() {
            return Err(DeviceControlError::InvalidArgument(
                "builtInLabel cannot be empty".to_string(),
            ));
        }

        Ok(config)
    }
}
