//! Platform abstraction layer for audio input routing.
//!
//! One [`AudioRouteBackend`] per OS audio stack:
//! - Android: AudioManager / BluetoothAdapter via JNI
//! - iOS: AVAudioSession via the Objective-C runtime
//! - Desktop: CPAL

pub mod audio;

pub use audio::{platform_backend, AudioRouteBackend, DeviceControlError, InputKind, WirelessDevices};

#[cfg(not(any(target_os = "ios", target_os = "android")))]
pub use audio::DesktopAudioRoute;

#[cfg(target_os = "android")]
pub use audio::AndroidAudioRoute;

#[cfg(target_os = "ios")]
pub use audio::IosAudioRoute;
