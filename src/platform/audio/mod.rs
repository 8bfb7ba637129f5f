//! Cross-platform audio input routing abstraction.
//!
//! Platform implementations:
//! - Android: AudioManager + BluetoothAdapter over JNI
//! - iOS: AVAudioSession through the Objective-C runtime
//! - Desktop (macOS/Windows/Linux): CPAL for input enumeration
//!
//! Backends only talk to the OS. Ordering, deduplication and the
//! built-in/external branch live in [`crate::service`].

use serde::Serialize;
use thiserror::Error;

/// Error type for device control operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceControlError {
    /// A required request argument was absent or malformed
    #[error("{0}")]
    InvalidArgument(String),
    /// The channel does not know the requested method
    #[error("Method not implemented: {0}")]
    NotImplemented(String),
    /// The OS refused the routing change
    #[error("Audio routing failed: {0}")]
    Routing(String),
    /// JNI / Objective-C runtime failure
    #[error("Platform error: {0}")]
    Platform(String),
    /// Operation has no meaning on this platform
    #[error("Audio device control not supported on this platform")]
    NotSupported,
}

impl DeviceControlError {
    /// Stable code reported to channel callers
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NotImplemented(_) => "NOT_IMPLEMENTED",
            Self::Routing(_) => "ROUTING_FAILED",
            Self::Platform(_) => "PLATFORM_ERROR",
            Self::NotSupported => "NOT_SUPPORTED",
        }
    }
}

impl From<DeviceControlError> for String {
    fn from(err: DeviceControlError) -> Self {
        err.to_string()
    }
}

/// Where an input device was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InputKind {
    /// The default built-in microphone sentinel
    BuiltIn,
    /// Paired/bonded short-range wireless device
    Wireless,
    /// Any other input endpoint the OS reports (wired headset, USB, ...)
    System,
}

/// Outcome of the paired wireless device scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WirelessDevices {
    /// Names of bonded devices, in OS order
    Listed(Vec<String>),
    /// Caller lacks the runtime permission to read bonded devices
    PermissionDenied,
    /// No wireless adapter on this device
    AdapterUnavailable,
    /// Backend reports wireless inputs through `system_inputs`
    NotApplicable,
}

/// Trait for platform-specific audio routing implementations
pub trait AudioRouteBackend: Send + Sync {
    /// Short name used in logs
    fn backend_name(&self) -> &'static str;

    /// Paired wireless audio devices. Missing permission is not an error.
    fn paired_wireless_devices(&self) -> Result<WirelessDevices, DeviceControlError>;

    /// Other input-capable endpoints known to the OS
    fn system_inputs(&self) -> Result<Vec<String>, DeviceControlError>;

    /// Disable wireless routing and fall back to the default input
    fn release_external_route(&self) -> Result<(), DeviceControlError>;

    /// Enable wireless routing, preferring the input called `name` where the OS allows it
    fn engage_external_route(&self, name: &str) -> Result<(), DeviceControlError>;
}

impl<T: AudioRouteBackend + ?Sized> AudioRouteBackend for Box<T> {
    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    fn paired_wireless_devices(&self) -> Result<WirelessDevices, DeviceControlError> {
        (**self).paired_wireless_devices()
    }

    fn system_inputs(&self) -> Result<Vec<String>, DeviceControlError> {
        (**self).system_inputs()
    }

    fn release_external_route(&self) -> Result<(), DeviceControlError> {
        (**self).release_external_route()
    }

    fn engage_external_route(&self, name: &str) -> Result<(), DeviceControlError> {
        (**self).engage_external_route(name)
    }
}

// Desktop implementation using CPAL
#[cfg(not(any(target_os = "ios", target_os = "android")))]
mod desktop;

#[cfg(not(any(target_os = "ios", target_os = "android")))]
pub use desktop::DesktopAudioRoute;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(target_os = "android")]
pub use android::AndroidAudioRoute;

#[cfg(target_os = "ios")]
mod ios;

#[cfg(target_os = "ios")]
pub use ios::IosAudioRoute;

/// Return the routing backend for the current target
pub fn platform_backend() -> Box<dyn AudioRouteBackend> {
    #[cfg(target_os = "android")]
    {
        Box::new(AndroidAudioRoute::new())
    }
    #[cfg(target_os = "ios")]
    {
        Box::new(IosAudioRoute::new())
    }
    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        Box::new(DesktopAudioRoute::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DeviceControlError::InvalidArgument("x".into()).code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(DeviceControlError::Routing("x".into()).code(), "ROUTING_FAILED");
        assert_eq!(DeviceControlError::NotSupported.code(), "NOT_SUPPORTED");
    }

    #[test]
    fn test_error_into_string() {
        let msg: String = DeviceControlError::InvalidArgument("Device name not provided".into()).into();
        assert_eq!(msg, "Device name not provided");
    }

    #[test]
    fn test_platform_backend_has_name() {
        let backend = platform_backend();
        assert!(!backend.backend_name().is_empty());
    }
}
