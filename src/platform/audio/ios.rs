//! iOS audio routing using AVAudioSession.
//!
//! Talks to `AVAudioSession.sharedInstance()` through the Objective-C
//! runtime. Bluetooth HFP inputs are part of `availableInputs`, so there
//! is no separate paired-device scan.

use objc2::msg_send;
use objc2::rc::Retained;
use objc2::runtime::{AnyClass, AnyObject};
use objc2_foundation::{NSArray, NSError, NSString};

use super::{AudioRouteBackend, DeviceControlError, WirelessDevices};

#[link(name = "AVFoundation", kind = "framework")]
extern "C" {}

/// Value of the `AVAudioSessionCategoryPlayAndRecord` constant
const CATEGORY_PLAY_AND_RECORD: &str = "AVAudioSessionCategoryPlayAndRecord";
/// `AVAudioSessionCategoryOptionAllowBluetooth`
const OPTION_ALLOW_BLUETOOTH: usize = 0x4;

/// iOS routing implementation backed by the shared audio session
pub struct IosAudioRoute;

impl IosAudioRoute {
    /// Create a new iOS routing instance
    pub fn new() -> Self {
        Self
    }

    fn session(&self) -> Result<Retained<AnyObject>, DeviceControlError> {
        let class = AnyClass::get(c"AVAudioSession").ok_or_else(|| {
            DeviceControlError::Platform("AVAudioSession class not found".to_string())
        })?;

        let session: Option<Retained<AnyObject>> = unsafe { msg_send![class, sharedInstance] };
        session.ok_or_else(|| {
            DeviceControlError::Platform("AVAudioSession.sharedInstance returned nil".to_string())
        })
    }

    fn available_inputs(
        &self,
        session: &AnyObject,
    ) -> Vec<Retained<AnyObject>> {
        let inputs: Option<Retained<NSArray<AnyObject>>> =
            unsafe { msg_send![session, availableInputs] };

        inputs.map(|list| list.to_vec()).unwrap_or_default()
    }

    fn category_options(&self, session: &AnyObject) -> usize {
        unsafe { msg_send![session, categoryOptions] }
    }

    fn set_category(&self, session: &AnyObject, options: usize) -> Result<(), DeviceControlError> {
        let category = NSString::from_str(CATEGORY_PLAY_AND_RECORD);
        let result: Result<(), Retained<NSError>> = unsafe {
            msg_send![session, setCategory: &*category, withOptions: options, error: _]
        };
        result.map_err(routing_error)
    }

    fn set_preferred_input(
        &self,
        session: &AnyObject,
        port: Option<&AnyObject>,
    ) -> Result<(), DeviceControlError> {
        let result: Result<(), Retained<NSError>> =
            unsafe { msg_send![session, setPreferredInput: port, error: _] };
        result.map_err(routing_error)
    }
}

impl Default for IosAudioRoute {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioRouteBackend for IosAudioRoute {
    fn backend_name(&self) -> &'static str {
        "avaudiosession"
    }

    fn paired_wireless_devices(&self) -> Result<WirelessDevices, DeviceControlError> {
        Ok(WirelessDevices::NotApplicable)
    }

    fn system_inputs(&self) -> Result<Vec<String>, DeviceControlError> {
        let session = self.session()?;
        let names = self
            .available_inputs(&session)
            .iter()
            .map(|port| port_name(port))
            .collect();
        Ok(names)
    }

    fn release_external_route(&self) -> Result<(), DeviceControlError> {
        let session = self.session()?;
        let options = without_bluetooth(self.category_options(&session));
        self.set_category(&session, options)?;
        self.set_preferred_input(&session, None)?;
        tracing::info!("Audio session reverted to default input");
        Ok(())
    }

    fn engage_external_route(&self, name: &str) -> Result<(), DeviceControlError> {
        let session = self.session()?;
        let options = with_bluetooth(self.category_options(&session));
        self.set_category(&session, options)?;

        let inputs = self.available_inputs(&session);
        let port = inputs.iter().find(|port| port_name(port) == name);
        if port.is_none() {
            tracing::warn!("No available input named '{}', keeping system choice", name);
        }

        self.set_preferred_input(&session, port.map(|p| &**p))?;
        tracing::info!("Preferred input set to '{}'", name);
        Ok(())
    }
}

/// Keep the host's other category options, only add Bluetooth input
fn with_bluetooth(options: usize) -> usize {
    options | OPTION_ALLOW_BLUETOOTH
}

fn without_bluetooth(options: usize) -> usize {
    options & !OPTION_ALLOW_BLUETOOTH
}

fn port_name(port: &AnyObject) -> String {
    let name: Retained<NSString> = unsafe { msg_send![port, portName] };
    name.to_string()
}

fn routing_error(err: Retained<NSError>) -> DeviceControlError {
    DeviceControlError::Routing(err.localizedDescription().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `MixWithOthers | DefaultToSpeaker`
    const HOST_OPTIONS: usize = 0x1 | 0x8;

    #[test]
    fn test_bluetooth_toggle_keeps_host_options() {
        let engaged = with_bluetooth(HOST_OPTIONS);
        assert_eq!(engaged, HOST_OPTIONS | OPTION_ALLOW_BLUETOOTH);
        assert_eq!(without_bluetooth(engaged), HOST_OPTIONS);
        assert_eq!(without_bluetooth(HOST_OPTIONS), HOST_OPTIONS);
    }
}
