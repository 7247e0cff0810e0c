fn main() {
    println!("cargo:rerun-if-env-changed=TECRIG_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=TECRIG_WIFI_PASS");
    println!("cargo:rerun-if-env-changed=TECRIG_ENDPOINT");

    // Host builds (tests, simulation) have no ESP-IDF toolchain to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
