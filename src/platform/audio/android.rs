//! Android audio routing implementation
//!
//! Uses JNI to reach the platform audio stack:
//! - `BluetoothAdapter` bonded devices (gated on `BLUETOOTH_CONNECT`)
//! - `AudioManager.getDevices(GET_DEVICES_INPUTS)` on API 23+
//! - Bluetooth SCO start/stop for routing

use jni::objects::{JObject, JObjectArray, JString, JValue};
use jni::JNIEnv;
use std::sync::OnceLock;

use super::{AudioRouteBackend, DeviceControlError, WirelessDevices};

/// Global JVM reference for Android
static JAVA_VM: OnceLock<jni::JavaVM> = OnceLock::new();

const BLUETOOTH_CONNECT: &str = "android.permission.BLUETOOTH_CONNECT";
const PERMISSION_GRANTED: i32 = 0;
const GET_DEVICES_INPUTS: i32 = 1;
/// `Build.VERSION_CODES.M`, first release with `AudioManager.getDevices`
const API_MARSHMALLOW: i32 = 23;

/// Initialize the JVM reference (called from the host's Android setup)
pub fn init_jvm(vm: jni::JavaVM) {
    let _ = JAVA_VM.set(vm);
}

/// Android routing implementation backed by `AudioManager`
pub struct AndroidAudioRoute;

impl AndroidAudioRoute {
    /// Create a new Android routing instance
    pub fn new() -> Self {
        Self
    }

    /// Get JNI environment
    fn get_env(&self) -> Result<jni::AttachGuard<'static>, DeviceControlError> {
        let vm = JAVA_VM
            .get()
            .ok_or_else(|| DeviceControlError::Platform("JVM not initialized".to_string()))?;

        vm.attach_current_thread()
            .map_err(|e| DeviceControlError::Platform(format!("Failed to attach to JVM: {}", e)))
    }

    /// Application context via `ActivityThread.currentActivityThread().getApplication()`
    fn application_context<'a>(&self, env: &mut JNIEnv<'a>) -> Result<JObject<'a>, DeviceControlError> {
        let activity_thread = env
            .call_static_method(
                "android/app/ActivityThread",
                "currentActivityThread",
                "()Landroid/app/ActivityThread;",
                &[],
            )
            .and_then(|v| v.l());
        let activity_thread = check(env, activity_thread, "currentActivityThread")?;

        call_object(
            env,
            &activity_thread,
            "getApplication",
            "()Landroid/app/Application;",
            &[],
        )
    }

    fn audio_manager<'a>(
        &self,
        env: &mut JNIEnv<'a>,
        context: &JObject<'a>,
    ) -> Result<JObject<'a>, DeviceControlError> {
        let service_name = env.new_string("audio");
        let service_name = check(env, service_name, "new_string")?;

        let manager = call_object(
            env,
            context,
            "getSystemService",
            "(Ljava/lang/String;)Ljava/lang/Object;",
            &[JValue::Object(&service_name)],
        )?;

        if manager.is_null() {
            return Err(DeviceControlError::Platform(
                "AudioManager service unavailable".to_string(),
            ));
        }
        Ok(manager)
    }

    fn has_bluetooth_permission<'a>(
        &self,
        env: &mut JNIEnv<'a>,
        context: &JObject<'a>,
    ) -> Result<bool, DeviceControlError> {
        let sdk = self.sdk_int(env)?;
        if !has_runtime_permissions(sdk) {
            tracing::debug!("SDK {} has no Context.checkSelfPermission", sdk);
            return Ok(false);
        }

        let permission = env.new_string(BLUETOOTH_CONNECT);
        let permission = check(env, permission, "new_string")?;

        let status = env
            .call_method(
                context,
                "checkSelfPermission",
                "(Ljava/lang/String;)I",
                &[JValue::Object(&permission)],
            )
            .and_then(|v| v.i());
        let status = check(env, status, "checkSelfPermission")?;

        Ok(status == PERMISSION_GRANTED)
    }

    fn sdk_int(&self, env: &mut JNIEnv<'_>) -> Result<i32, DeviceControlError> {
        let sdk = env
            .get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
            .and_then(|v| v.i());
        check(env, sdk, "Build.VERSION.SDK_INT")
    }

    /// Toggle Bluetooth SCO, the only input route switch `AudioManager` offers here
    fn set_sco(&self, enabled: bool) -> Result<(), DeviceControlError> {
        let mut env = self.get_env()?;
        let context = self.application_context(&mut env)?;
        let manager = self.audio_manager(&mut env, &context)?;

        let (toggle, flag) = if enabled {
            ("startBluetoothSco", 1u8)
        } else {
            ("stopBluetoothSco", 0u8)
        };

        let result = env.call_method(&manager, toggle, "()V", &[]);
        route_check(&mut env, result, toggle)?;

        let result = env.call_method(&manager, "setBluetoothScoOn", "(Z)V", &[JValue::Bool(flag)]);
        route_check(&mut env, result, "setBluetoothScoOn")?;

        Ok(())
    }
}

impl Default for AndroidAudioRoute {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioRouteBackend for AndroidAudioRoute {
    fn backend_name(&self) -> &'static str {
        "android"
    }

    fn paired_wireless_devices(&self) -> Result<WirelessDevices, DeviceControlError> {
        let mut env = self.get_env()?;
        let context = self.application_context(&mut env)?;

        let adapter = env
            .call_static_method(
                "android/bluetooth/BluetoothAdapter",
                "getDefaultAdapter",
                "()Landroid/bluetooth/BluetoothAdapter;",
                &[],
            )
            .and_then(|v| v.l());
        let adapter = check(&mut env, adapter, "getDefaultAdapter")?;

        if adapter.is_null() {
            return Ok(WirelessDevices::AdapterUnavailable);
        }

        if !self.has_bluetooth_permission(&mut env, &context)? {
            return Ok(WirelessDevices::PermissionDenied);
        }

        let bonded = call_object(&mut env, &adapter, "getBondedDevices", "()Ljava/util/Set;", &[])?;
        if bonded.is_null() {
            return Ok(WirelessDevices::Listed(Vec::new()));
        }

        let array = call_object(&mut env, &bonded, "toArray", "()[Ljava/lang/Object;", &[])?;
        let devices = JObjectArray::from(array);

        let names = collect_names(&mut env, &devices, |env, device| {
            let name = call_object(env, device, "getName", "()Ljava/lang/String;", &[])?;
            read_string(env, name)
        })?;

        Ok(WirelessDevices::Listed(names))
    }

    fn system_inputs(&self) -> Result<Vec<String>, DeviceControlError> {
        let mut env = self.get_env()?;

        let sdk = self.sdk_int(&mut env)?;
        if !has_runtime_permissions(sdk) {
            tracing::debug!("SDK {} has no AudioManager.getDevices", sdk);
            return Ok(Vec::new());
        }

        let context = self.application_context(&mut env)?;
        let manager = self.audio_manager(&mut env, &context)?;

        let array = call_object(
            &mut env,
            &manager,
            "getDevices",
            "(I)[Landroid/media/AudioDeviceInfo;",
            &[JValue::Int(GET_DEVICES_INPUTS)],
        )?;
        let devices = JObjectArray::from(array);

        collect_names(&mut env, &devices, |env, device| {
            let product = call_object(env, device, "getProductName", "()Ljava/lang/CharSequence;", &[])?;
            if product.is_null() {
                return Ok(None);
            }
            let name = call_object(env, &product, "toString", "()Ljava/lang/String;", &[])?;
            read_string(env, name)
        })
    }

    fn release_external_route(&self) -> Result<(), DeviceControlError> {
        self.set_sco(false)?;
        tracing::info!("Bluetooth SCO stopped; using built-in microphone");
        Ok(())
    }

    fn engage_external_route(&self, name: &str) -> Result<(), DeviceControlError> {
        self.set_sco(true)?;
        tracing::info!("Bluetooth SCO started for '{}'", name);
        Ok(())
    }
}

/// `checkSelfPermission` and `getDevices` both arrived in API 23
fn has_runtime_permissions(sdk: i32) -> bool {
    sdk >= API_MARSHMALLOW
}

/// Map a JNI result, clearing any pending Java exception
fn check<T>(
    env: &mut JNIEnv<'_>,
    result: jni::errors::Result<T>,
    what: &str,
) -> Result<T, DeviceControlError> {
    result.map_err(|e| {
        clear_exception(env);
        DeviceControlError::Platform(format!("{} failed: {}", what, e))
    })
}

/// Same as [`check`] but reports failures as routing rejections
fn route_check<T>(
    env: &mut JNIEnv<'_>,
    result: jni::errors::Result<T>,
    what: &str,
) -> Result<T, DeviceControlError> {
    result.map_err(|e| {
        clear_exception(env);
        DeviceControlError::Routing(format!("{} failed: {}", what, e))
    })
}

fn clear_exception(env: &mut JNIEnv<'_>) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
}

fn call_object<'a>(
    env: &mut JNIEnv<'a>,
    target: &JObject<'_>,
    name: &str,
    sig: &str,
    args: &[JValue<'_, '_>],
) -> Result<JObject<'a>, DeviceControlError> {
    let value = env.call_method(target, name, sig, args).and_then(|v| v.l());
    check(env, value, name)
}

/// Convert a `java.lang.String` reference, treating null as absent
fn read_string(env: &mut JNIEnv<'_>, obj: JObject<'_>) -> Result<Option<String>, DeviceControlError> {
    if obj.is_null() {
        return Ok(None);
    }
    let jstring = JString::from(obj);
    let value = env.get_string(&jstring).map(String::from);
    let value = check(env, value, "get_string")?;
    let _ = env.delete_local_ref(jstring);
    Ok(Some(value))
}

/// Walk a Java object array, keeping the non-null names `name_of` returns
fn collect_names<'a, F>(
    env: &mut JNIEnv<'a>,
    array: &JObjectArray<'a>,
    mut name_of: F,
) -> Result<Vec<String>, DeviceControlError>
where
    F: FnMut(&mut JNIEnv<'a>, &JObject<'a>) -> Result<Option<String>, DeviceControlError>,
{
    if array.is_null() {
        return Ok(Vec::new());
    }

    let len = env.get_array_length(array);
    let len = check(env, len, "get_array_length")?;

    let mut names = Vec::with_capacity(len as usize);
    for i in 0..len {
        let element = env.get_object_array_element(array, i);
        let element = check(env, element, "get_object_array_element")?;

        match name_of(env, &element)? {
            Some(name) => names.push(name),
            None => tracing::warn!("Skipping audio device with no name"),
        }

        let _ = env.delete_local_ref(element);
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_check_gated_on_sdk() {
        assert!(!has_runtime_permissions(21));
        assert!(!has_runtime_permissions(22));
        assert!(has_runtime_permissions(23));
        assert!(has_runtime_permissions(34));
    }
}
