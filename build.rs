fn main() {
    #[cfg(feature = "plugin")]
    tauri_plugin::Builder::new(&["get_input_devices", "set_input_device", "invoke_method"]).build();
}
