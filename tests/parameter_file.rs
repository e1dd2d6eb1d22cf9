//! Parameter file scenarios across simulated reboots

use esp_robot::parameters::wifi::{wifi_table, WIFI_PARAMETER_PATH};
use esp_robot::parameters::{
    clear_parameter, get_parameters, set_parameter, LoadSource, ParamValue, ParameterError,
    WifiParams,
};
use esp_robot::platform::mock::MockFileSystem;

fn record(name: &str, ty: u8, value: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for field in [name, &ty.to_string(), value] {
        out.extend_from_slice(field.as_bytes());
        out.push(0);
    }
    out
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn first_boot_writes_defaults() {
    let mut fs = MockFileSystem::new();
    let mut table = wifi_table();
    let mut out = String::new();

    let source = get_parameters(&mut fs, WIFI_PARAMETER_PATH, &mut table, Some(&mut out)).unwrap();
    assert_eq!(source, LoadSource::RewrittenDefaults);
    assert!(out.contains("not found"));

    let file = fs.contents(WIFI_PARAMETER_PATH).unwrap();
    assert!(contains(&file, &record("NET_AP_IP", 8, "0x00000000c0a80401")));
    assert!(contains(&file, &record("NET_AP_MASK", 8, "0x00000000ffffff00")));
    assert!(contains(&file, &record("NET_SSID2", 0, "nullptr")));

    // second boot reads the file as written
    let mut table = wifi_table();
    let source = get_parameters(&mut fs, WIFI_PARAMETER_PATH, &mut table, None).unwrap();
    assert_eq!(source, LoadSource::File);
    assert!(table.was_loaded("NET_RETRY_MAX"));
}

#[test]
fn operator_file_drives_wifi_params() {
    let mut fs = MockFileSystem::new();
    let mut file = Vec::new();
    file.extend(record("NET_SSID", 12, "home"));
    file.extend(record("NET_STA_CHAN", 6, "0x000000000000000b"));
    file.extend(record("NET_STA_ENABLE", 1, "0x0000000000000001"));
    file.extend(record("NET_LEGACY", 6, "0x0000000000000001"));
    fs.insert_file(WIFI_PARAMETER_PATH, &file);

    let mut table = wifi_table();
    let mut out = String::new();
    let source = get_parameters(&mut fs, WIFI_PARAMETER_PATH, &mut table, Some(&mut out)).unwrap();
    assert_eq!(source, LoadSource::File);
    assert!(out.contains("NET_LEGACY: unknown parameter, skipped"));
    assert!(out.contains("NET_PASS: not in file, using default"));

    let wifi = WifiParams::from_table(&table);
    assert!(wifi.station);
    assert_eq!(wifi.config.station_channel, 11);
    assert_eq!(wifi.config.access_points[0].ssid.as_str(), "home");

    // a clean read leaves the file alone
    assert_eq!(fs.contents(WIFI_PARAMETER_PATH).unwrap(), file);
}

#[test]
fn out_of_range_value_heals_to_defaults() {
    let mut fs = MockFileSystem::new();
    let mut file = Vec::new();
    file.extend(record("NET_SSID", 12, "home"));
    file.extend(record("NET_STA_CHAN", 6, "0x000000000000000f"));
    fs.insert_file(WIFI_PARAMETER_PATH, &file);

    let mut table = wifi_table();
    let source = get_parameters(&mut fs, WIFI_PARAMETER_PATH, &mut table, None).unwrap();
    assert_eq!(source, LoadSource::RewrittenDefaults);

    let defaults = wifi_table();
    assert_eq!(table.get("NET_SSID"), defaults.get("NET_SSID"));
    assert_eq!(table.get_u8("NET_STA_CHAN"), defaults.get_u8("NET_STA_CHAN"));
    assert!(!contains(
        &fs.contents(WIFI_PARAMETER_PATH).unwrap(),
        b"0x000000000000000f"
    ));
}

#[test]
fn set_and_clear_survive_reboot() {
    let mut fs = MockFileSystem::new();
    let mut table = wifi_table();
    get_parameters(&mut fs, WIFI_PARAMETER_PATH, &mut table, None).unwrap();

    set_parameter(&mut fs, WIFI_PARAMETER_PATH, &mut table, "NET_AP_CHAN", b"9", None).unwrap();
    set_parameter(&mut fs, WIFI_PARAMETER_PATH, &mut table, "NET_SSID", b"home", None).unwrap();
    assert_eq!(
        set_parameter(&mut fs, WIFI_PARAMETER_PATH, &mut table, "NET_AP_CHAN", b"99", None),
        Err(ParameterError::InvalidValue)
    );

    let mut rebooted = wifi_table();
    assert_eq!(
        get_parameters(&mut fs, WIFI_PARAMETER_PATH, &mut rebooted, None).unwrap(),
        LoadSource::File
    );
    assert_eq!(rebooted.get_u8("NET_AP_CHAN"), Some(9));
    assert_eq!(rebooted.get_str("NET_SSID"), Some("home"));

    clear_parameter(&mut fs, WIFI_PARAMETER_PATH, &mut rebooted, "NET_SSID", None).unwrap();
    let mut rebooted = wifi_table();
    get_parameters(&mut fs, WIFI_PARAMETER_PATH, &mut rebooted, None).unwrap();
    assert_eq!(rebooted.get("NET_SSID"), Some(&ParamValue::Null));
    assert!(!WifiParams::from_table(&rebooted).station);
}

#[test]
fn interrupted_write_is_healed_next_boot() {
    let mut fs = MockFileSystem::new();
    let mut table = wifi_table();
    get_parameters(&mut fs, WIFI_PARAMETER_PATH, &mut table, None).unwrap();
    set_parameter(&mut fs, WIFI_PARAMETER_PATH, &mut table, "NET_SSID", b"home", None).unwrap();
    set_parameter(&mut fs, WIFI_PARAMETER_PATH, &mut table, "NET_PASS", b"pw", None).unwrap();

    // cut inside the NET_PASS record
    fs.fail_writes_after(20);
    let result = set_parameter(&mut fs, WIFI_PARAMETER_PATH, &mut table, "NET_AP_CHAN", b"3", None);
    assert!(matches!(result, Err(ParameterError::Io(_))));
    assert!(fs.contents(WIFI_PARAMETER_PATH).unwrap().len() <= 20);

    fs.clear_write_failure();
    let mut rebooted = wifi_table();
    let source = get_parameters(&mut fs, WIFI_PARAMETER_PATH, &mut rebooted, None).unwrap();
    assert_eq!(source, LoadSource::RewrittenDefaults);
    assert_eq!(rebooted.get_u8("NET_AP_CHAN"), wifi_table().get_u8("NET_AP_CHAN"));
}

#[test]
fn unavailable_storage_uses_defaults() {
    let mut fs = MockFileSystem::unavailable();
    let mut table = wifi_table();
    let source = get_parameters(&mut fs, WIFI_PARAMETER_PATH, &mut table, None).unwrap();
    assert_eq!(source, LoadSource::Defaults);
    assert!(fs.contents(WIFI_PARAMETER_PATH).is_none());
    assert_eq!(table.get_u32("NET_AP_IP"), Some(0xC0A8_0401));
}
