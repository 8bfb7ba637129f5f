pub mod channel;
pub mod config;
pub mod platform;
pub mod service;

#[cfg(feature = "plugin")]
pub mod plugin;

pub use channel::{DeviceControlChannel, MethodCall, MethodResponse};
pub use config::DeviceControlConfig;
pub use platform::{platform_backend, AudioRouteBackend, DeviceControlError};
pub use service::{DeviceControlService, DeviceEnumeration, InputScan, WirelessScan};

/// Channel wired to the audio backend of the current target
pub fn platform_channel(config: DeviceControlConfig) -> DeviceControlChannel<Box<dyn AudioRouteBackend>> {
    DeviceControlChannel::new(platform_backend(), config)
}
