use std::env;

/// Build-time WiFi defaults: (environment variable, fallback value, secret)
///
/// Values end up as defaults in the WiFi parameter table and are only used
/// when the parameter file is missing or does not contain the entry.
const WIFI_DEFAULTS: [(&str, &str, bool); 8] = [
    ("WIFI_SSID", "", false),
    ("WIFI_PASSWORD", "", true),
    ("WIFI_HOSTNAME", "esp-robot", false),
    ("WIFI_AP_SSID", "esp-robot", false),
    ("WIFI_AP_PASSWORD", "", true),
    ("WIFI_STA_CHANNEL", "0", false),
    ("WIFI_AP_CHANNEL", "0", false),
    ("WIFI_ESPNOW_CHANNEL", "0", false),
];

fn main() {
    for (name, fallback, secret) in WIFI_DEFAULTS {
        match env::var(name) {
            Ok(value) => {
                println!("cargo:rustc-env={}={}", name, value);
                if secret {
                    println!("cargo:warning=Using {} from environment (hidden)", name);
                } else {
                    println!("cargo:warning=Using {} from environment: {}", name, value);
                }
            }
            Err(_) => println!("cargo:rustc-env={}={}", name, fallback),
        }
        println!("cargo:rerun-if-env-changed={}", name);
    }
}
