//! Boot flow: parameters to radio, then a dropped station and its recovery

use embassy_time::{Duration, Instant};
use esp_robot::core::traits::MockState;
use esp_robot::parameters::wifi::{wifi_table, WIFI_PARAMETER_PATH};
use esp_robot::parameters::{LoadSource, SharedParameters};
use esp_robot::platform::mock::{MockFileSystem, MockRadio, MockTimer, RadioCall};
use esp_robot::radio::{Personality, RadioCoordinator, RadioEvent, RadioEvents};

fn record(name: &str, ty: u8, value: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for field in [name, &ty.to_string(), value] {
        out.extend_from_slice(field.as_bytes());
        out.push(0);
    }
    out
}

fn robot_filesystem() -> MockFileSystem {
    let fs = MockFileSystem::new();
    let mut file = Vec::new();
    file.extend(record("NET_SSID", 12, "home"));
    file.extend(record("NET_PASS", 12, "secret"));
    file.extend(record("NET_STA_CHAN", 6, "0x0000000000000000"));
    file.extend(record("NET_STA_ENABLE", 1, "0x0000000000000001"));
    file.extend(record("NET_AP_CHAN", 6, "0x0000000000000000"));
    file.extend(record("NET_AP_ENABLE", 1, "0x0000000000000000"));
    file.extend(record("NET_NOW_CHAN", 6, "0x0000000000000000"));
    file.extend(record("NET_NOW_ENABLE", 1, "0x0000000000000001"));
    file.extend(record("NET_RETRY_MIN", 8, "0x00000000000001f4"));
    file.extend(record("NET_RETRY_MAX", 8, "0x00000000000007d0"));
    fs.insert_file(WIFI_PARAMETER_PATH, &file);
    fs
}

fn robot_radio() -> MockRadio {
    let mut radio = MockRadio::new();
    radio.add_network("neighbour", 1, -40);
    radio.add_network("home", 6, -62);
    radio.add_network("home", 6, -48);
    radio
}

#[test]
fn boot_then_reconnect_with_backoff() {
    let mut fs = robot_filesystem();
    let params = SharedParameters::new(MockState::new(wifi_table()), WIFI_PARAMETER_PATH);
    assert_eq!(params.load(&mut fs, None).unwrap(), LoadSource::File);
    let wifi = params.wifi_params();
    assert!(wifi.station && wifi.espnow && !wifi.soft_ap);

    let events = RadioEvents::new();
    let mut radio =
        RadioCoordinator::new(robot_radio(), MockTimer::new(), wifi.config.clone(), &events);
    radio
        .enable(wifi.espnow, wifi.soft_ap, wifi.station, None)
        .unwrap();

    assert!(radio.is_online(Personality::Station));
    assert!(radio.is_online(Personality::EspNow));
    assert_eq!(radio.channel(), 6);
    assert_eq!(radio.radio().connected_ssid(), Some("home"));
    // strongest of the two "home" entries
    assert_eq!(
        radio.state().selected_ap.as_ref().map(|ap| ap.info.rssi),
        Some(-48)
    );

    // access point drops the station
    radio.radio_mut().drop_station();
    radio.radio_mut().set_ip_never(true);
    events.sender().post(RadioEvent::StationDisconnected);
    radio.poll(Instant::from_millis(1_000), None).unwrap();
    assert!(!radio.is_online(Personality::Station));
    assert!(radio.is_online(Personality::EspNow));
    assert_eq!(radio.state().next_reconnect, Some(Instant::from_millis(1_500)));

    // first attempt fails; ESP-NOW keeps its channel throughout
    let mut out = String::new();
    assert!(radio.poll(Instant::from_millis(1_500), Some(&mut out)).is_err());
    assert!(out.contains("retry in 1000 ms"));
    assert!(radio.is_online(Personality::EspNow));
    assert_eq!(radio.channel(), 6);
    assert_eq!(radio.reconnect_delay(), Duration::from_millis(1_000));
    assert_eq!(radio.state().next_reconnect, Some(Instant::from_millis(2_500)));

    // network is back
    radio.radio_mut().set_ip_never(false);
    radio.poll(Instant::from_millis(2_000), None).unwrap();
    assert!(!radio.is_online(Personality::Station));
    radio.poll(Instant::from_millis(2_500), None).unwrap();
    assert!(radio.is_online(Personality::Station));
    assert!(!radio.reconnect_pending());
    assert_eq!(radio.reconnect_delay(), Duration::from_millis(500));

    let mut report = String::new();
    radio.status_report(Some(&mut report));
    assert!(report.contains("Station: online"));
    assert!(report.contains("ESP-NOW: online"));
    assert!(report.contains("Soft-AP: off"));
}

#[test]
fn settings_change_adds_soft_ap_on_shared_channel() {
    let mut fs = robot_filesystem();
    let params = SharedParameters::new(MockState::new(wifi_table()), WIFI_PARAMETER_PATH);
    params.load(&mut fs, None).unwrap();
    let wifi = params.wifi_params();

    let events = RadioEvents::new();
    let mut radio =
        RadioCoordinator::new(robot_radio(), MockTimer::new(), wifi.config.clone(), &events);
    radio
        .enable(wifi.espnow, wifi.soft_ap, wifi.station, None)
        .unwrap();
    let connects = radio.radio().count_of(RadioCall::Connect);

    params.set(&mut fs, "NET_AP_ENABLE", b"1", None).unwrap();
    params.set(&mut fs, "NET_AP_CHAN", b"11", None).unwrap();
    let wifi = params.wifi_params();
    radio.apply_config(wifi.config.clone());
    radio
        .enable(wifi.espnow, wifi.soft_ap, wifi.station, None)
        .unwrap();

    // the station already owns channel 6, so the soft-AP joins it
    assert!(radio.is_online(Personality::SoftAp));
    assert_eq!(radio.channel(), 6);
    assert_eq!(radio.radio().count_of(RadioCall::Connect), connects);
    assert!(radio.radio().is_ap_running());

    // and the new settings were persisted
    let mut rebooted = wifi_table();
    esp_robot::parameters::get_parameters(&mut fs, WIFI_PARAMETER_PATH, &mut rebooted, None)
        .unwrap();
    assert_eq!(rebooted.get_bool("NET_AP_ENABLE"), Some(true));
    assert_eq!(rebooted.get_u8("NET_AP_CHAN"), Some(11));
}

#[test]
fn everything_off_releases_the_radio() {
    let events = RadioEvents::new();
    let mut fs = robot_filesystem();
    let params = SharedParameters::new(MockState::new(wifi_table()), WIFI_PARAMETER_PATH);
    params.load(&mut fs, None).unwrap();
    let wifi = params.wifi_params();

    let mut radio = RadioCoordinator::new(robot_radio(), MockTimer::new(), wifi.config, &events);
    radio.enable(true, true, true, None).unwrap();
    radio.enable(false, false, false, None).unwrap();

    assert!(radio.started().is_empty());
    assert_eq!(radio.channel(), 0);
    assert!(radio.is_using_default_channel());
    assert!(!radio.radio().is_connected());
    assert!(!radio.radio().is_ap_running());
    assert!(!radio.radio().is_esp_now_running());
}
