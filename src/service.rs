//! Device control service.
//!
//! Stateless: every call asks the backend again and nothing about the
//! selected device is remembered between calls.

use serde::Serialize;

use crate::config::DeviceControlConfig;
use crate::platform::audio::{AudioRouteBackend, DeviceControlError, InputKind, WirelessDevices};

/// An input device as presented to callers. Identity is the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioInputDevice {
    pub name: String,
    pub kind: InputKind,
}

/// How the paired wireless scan went for one enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WirelessScan {
    /// Scan ran and reported this many bonded devices
    Listed(usize),
    PermissionDenied,
    AdapterUnavailable,
    /// Backend lists wireless inputs with the system inputs
    NotApplicable,
    /// OS query failed; paired devices left out
    Failed,
    /// Disabled by config
    Skipped,
}

/// How the system input scan went for one enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InputScan {
    Listed(usize),
    /// OS query failed; only earlier entries are listed
    Failed,
    Skipped,
}

/// Result of one enumeration pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceEnumeration {
    pub devices: Vec<AudioInputDevice>,
    pub wireless: WirelessScan,
    pub system: InputScan,
}

impl DeviceEnumeration {
    /// Device names in result order
    pub fn names(&self) -> Vec<String> {
        self.devices.iter().map(|d| d.name.clone()).collect()
    }

    fn push_unique(&mut self, name: String, kind: InputKind) {
        if name.is_empty() || self.devices.iter().any(|d| d.name == name) {
            return;
        }
        self.devices.push(AudioInputDevice { name, kind });
    }
}

/// Route a selection resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    BuiltIn,
    External(String),
}

/// Lists input devices and applies routing changes through a platform backend
pub struct DeviceControlService<B: AudioRouteBackend> {
    backend: B,
    config: DeviceControlConfig,
}

impl<B: AudioRouteBackend> DeviceControlService<B> {
    pub fn new(backend: B, config: DeviceControlConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &DeviceControlConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Built-in microphone first, then bonded wireless devices, then other
    /// OS inputs, each in OS order and deduplicated by name.
    ///
    /// Never fails: a query the OS refuses is recorded in the scan outcome
    /// and the list carries whatever was gathered.
    pub fn list_input_devices(&self) -> DeviceEnumeration {
        let mut result = DeviceEnumeration {
            devices: vec![AudioInputDevice {
                name: self.config.built_in_label.clone(),
                kind: InputKind::BuiltIn,
            }],
            wireless: WirelessScan::Skipped,
            system: InputScan::Skipped,
        };

        if self.config.include_paired_wireless {
            result.wireless = match self.backend.paired_wireless_devices() {
                Ok(WirelessDevices::Listed(names)) => {
                    let count = names.len();
                    for name in names {
                        result.push_unique(name, InputKind::Wireless);
                    }
                    WirelessScan::Listed(count)
                }
                Ok(WirelessDevices::PermissionDenied) => {
                    tracing::debug!("Bluetooth permission not granted, skipping paired devices");
                    WirelessScan::PermissionDenied
                }
                Ok(WirelessDevices::AdapterUnavailable) => {
                    tracing::debug!("No Bluetooth adapter, skipping paired devices");
                    WirelessScan::AdapterUnavailable
                }
                Ok(WirelessDevices::NotApplicable) => WirelessScan::NotApplicable,
                Err(e) => {
                    tracing::warn!("Paired device scan failed: {}", e);
                    WirelessScan::Failed
                }
            };
        }

        if self.config.include_system_inputs {
            result.system = match self.backend.system_inputs() {
                Ok(names) => {
                    let count = names.len();
                    for name in names {
                        result.push_unique(name, InputKind::System);
                    }
                    InputScan::Listed(count)
                }
                Err(e) => {
                    tracing::warn!("System input scan failed: {}", e);
                    InputScan::Failed
                }
            };
        }

        tracing::debug!(
            "{} input devices via {}",
            result.devices.len(),
            self.backend.backend_name()
        );

        result
    }

    /// Classify a requested name against the built-in sentinel
    pub fn route_for(&self, name: &str) -> RouteTarget {
        if name == self.config.built_in_label {
            RouteTarget::BuiltIn
        } else {
            RouteTarget::External(name.to_string())
        }
    }

    /// The built-in label releases wireless routing; any other name engages it
    pub fn select_input_device(&self, name: &str) -> Result<(), DeviceControlError> {
        let result = match self.route_for(name) {
            RouteTarget::BuiltIn => {
                tracing::info!("Selecting built-in microphone");
                self.backend.release_external_route()
            }
            RouteTarget::External(name) => {
                tracing::info!("Selecting input device '{}'", name);
                self.backend.engage_external_route(&name)
            }
        };

        if let Err(e) = &result {
            tracing::warn!("Input selection rejected: {}", e);
        }
        result
    }
}
