//! Desktop input routing on top of CPAL enumeration.
//!
//! Desktop OSes give applications no route switch: new streams follow the
//! system default input. Selection is acknowledged for any name and only
//! logs whether CPAL currently sees that input.

use cpal::traits::{DeviceTrait, HostTrait};

use super::{AudioRouteBackend, DeviceControlError, WirelessDevices};

/// Desktop routing implementation using CPAL
pub struct DesktopAudioRoute;

impl DesktopAudioRoute {
    /// Create a new desktop routing instance
    pub fn new() -> Self {
        Self
    }

    fn input_names(&self) -> Result<Vec<String>, DeviceControlError> {
        let host = cpal::default_host();
        let devices: Vec<String> = host
            .input_devices()
            .map_err(|e| DeviceControlError::Platform(e.to_string()))?
            .filter_map(|d| d.name().ok())
            .collect();
        Ok(devices)
    }
}

impl Default for DesktopAudioRoute {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioRouteBackend for DesktopAudioRoute {
    fn backend_name(&self) -> &'static str {
        "cpal"
    }

    fn paired_wireless_devices(&self) -> Result<WirelessDevices, DeviceControlError> {
        // Bluetooth inputs show up as regular CPAL input devices
        Ok(WirelessDevices::NotApplicable)
    }

    fn system_inputs(&self) -> Result<Vec<String>, DeviceControlError> {
        self.input_names()
    }

    fn release_external_route(&self) -> Result<(), DeviceControlError> {
        tracing::debug!("Desktop input follows the OS default device");
        Ok(())
    }

    fn engage_external_route(&self, name: &str) -> Result<(), DeviceControlError> {
        match self.input_names() {
            Ok(names) if names.iter().any(|n| n == name) => {
                tracing::debug!("Input device '{}' is available", name);
            }
            Ok(_) => tracing::warn!("Input device '{}' is not currently listed", name),
            Err(e) => tracing::warn!("Could not enumerate inputs for '{}': {}", name, e),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_wireless_not_applicable() {
        let route = DesktopAudioRoute::new();
        assert_eq!(
            route.paired_wireless_devices(),
            Ok(WirelessDevices::NotApplicable)
        );
        assert!(route.release_external_route().is_ok());
    }

    #[test]
    fn test_desktop_acknowledges_unlisted_device() {
        let route = DesktopAudioRoute::new();
        // Holds on hosts with no audio stack at all
        assert_eq!(route.engage_external_route("Car Kit"), Ok(()));
        assert_eq!(route.engage_external_route("no-such-input-device-7f3a"), Ok(()));
    }
}
