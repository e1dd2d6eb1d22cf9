//! WiFi Parameter Definitions
//!
//! Persisted radio settings and their conversion into a `RadioConfig`.
//!
//! # Parameters
//!
//! - `NET_SSID` / `NET_PASS` - First access point (required)
//! - `NET_SSID2` / `NET_PASS2` - Fallback access point
//! - `NET_HOSTNAME` - DHCP hostname of both interfaces
//! - `NET_STA_CHAN` - Fixed station channel, 0 to follow the scan
//! - `NET_STA_ENABLE` - Join an access point at boot
//! - `NET_AP_SSID` / `NET_AP_PASS` / `NET_AP_CHAN` - Soft-AP network
//! - `NET_AP_IP` / `NET_AP_MASK` - Soft-AP address and netmask (big-endian u32)
//! - `NET_AP_ENABLE` - Run the soft-AP at boot
//! - `NET_NOW_CHAN` / `NET_NOW_ENABLE` - ESP-NOW channel and enable
//! - `NET_RETRY_MIN` / `NET_RETRY_MAX` - Station reconnect backoff bounds (ms)
//!
//! Defaults come from build-time environment variables (see `build.rs`) and
//! only apply when the parameter file lacks an entry.
//!
//! # Example
//!
//! ```ignore
//! use esp_robot::parameters::{get_parameters, wifi::{wifi_table, WifiParams, WIFI_PARAMETER_PATH}};
//!
//! let mut table = wifi_table();
//! get_parameters(&mut fs, WIFI_PARAMETER_PATH, &mut table, None)?;
//! let wifi = WifiParams::from_table(&table);
//! coordinator.apply_config(wifi.config.clone());
//! coordinator.enable(wifi.espnow, wifi.soft_ap, wifi.station, None)?;
//! ```

use super::descriptor::ParamDescriptor;
use super::table::ParameterTable;
use crate::platform::traits::SoftApIpConfig;
use crate::radio::config::{truncated, RadioConfig};
use embassy_time::Duration;

/// Parameter file holding the WiFi table
pub const WIFI_PARAMETER_PATH: &str = "/wifi.par";

/// Highest 2.4 GHz channel
const MAX_CHANNEL: u8 = 14;

/// Build-time channel default; anything unparsable or out of range means "no preference"
const fn parse_channel(text: &str) -> u8 {
    let bytes = text.as_bytes();
    if bytes.is_empty() || bytes.len() > 2 {
        return 0;
    }
    let mut value: u8 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !b.is_ascii_digit() {
            return 0;
        }
        value = value * 10 + (b - b'0');
        i += 1;
    }
    if value > MAX_CHANNEL {
        0
    } else {
        value
    }
}

/// Empty build-time strings leave the parameter null
const fn non_empty(text: &'static str) -> Option<&'static str> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

const DEFAULT_SSID: &str = env!("WIFI_SSID");

/// WiFi parameter descriptors
pub static WIFI_PARAMETERS: [ParamDescriptor; 17] = [
    ParamDescriptor::string("NET_SSID", non_empty(DEFAULT_SSID)).required(),
    ParamDescriptor::string("NET_PASS", non_empty(env!("WIFI_PASSWORD"))).required(),
    ParamDescriptor::string("NET_SSID2", None),
    ParamDescriptor::string("NET_PASS2", None),
    ParamDescriptor::string("NET_HOSTNAME", non_empty(env!("WIFI_HOSTNAME"))),
    ParamDescriptor::uint8(
        "NET_STA_CHAN",
        0,
        MAX_CHANNEL,
        parse_channel(env!("WIFI_STA_CHANNEL")),
    ),
    ParamDescriptor::boolean("NET_STA_ENABLE", !DEFAULT_SSID.is_empty()),
    ParamDescriptor::string("NET_AP_SSID", non_empty(env!("WIFI_AP_SSID"))),
    ParamDescriptor::string("NET_AP_PASS", non_empty(env!("WIFI_AP_PASSWORD"))),
    ParamDescriptor::uint8(
        "NET_AP_CHAN",
        0,
        MAX_CHANNEL,
        parse_channel(env!("WIFI_AP_CHANNEL")),
    ),
    ParamDescriptor::uint32("NET_AP_IP", 0, u32::MAX, 0xC0A8_0401),
    ParamDescriptor::uint32("NET_AP_MASK", 0, u32::MAX, 0xFFFF_FF00),
    // Without station credentials the soft-AP is the only way in
    ParamDescriptor::boolean("NET_AP_ENABLE", DEFAULT_SSID.is_empty()),
    ParamDescriptor::uint8(
        "NET_NOW_CHAN",
        0,
        MAX_CHANNEL,
        parse_channel(env!("WIFI_ESPNOW_CHANNEL")),
    ),
    ParamDescriptor::boolean("NET_NOW_ENABLE", false),
    ParamDescriptor::uint32("NET_RETRY_MIN", 100, 600_000, 1_000),
    ParamDescriptor::uint32("NET_RETRY_MAX", 100, 3_600_000, 60_000),
];

/// Fresh table over `WIFI_PARAMETERS`, holding the defaults
pub fn wifi_table() -> ParameterTable {
    ParameterTable::new(&WIFI_PARAMETERS)
}

/// WiFi settings derived from the live parameter table
#[derive(Debug, Clone, PartialEq)]
pub struct WifiParams {
    /// Radio coordinator configuration
    pub config: RadioConfig,
    /// Bring ESP-NOW online
    pub espnow: bool,
    /// Bring the soft-AP online
    pub soft_ap: bool,
    /// Bring the station online
    pub station: bool,
}

impl WifiParams {
    /// Read the WiFi parameters out of `table`
    ///
    /// Parameters the table does not hold, or that hold null, keep the
    /// `RadioConfig` defaults. The station is only enabled when at least
    /// one access point has an SSID.
    pub fn from_table(table: &ParameterTable) -> Self {
        let mut config = RadioConfig::default();

        for (ssid, password) in [("NET_SSID", "NET_PASS"), ("NET_SSID2", "NET_PASS2")] {
            match table.get_str(ssid) {
                Some(s) if !s.is_empty() => {
                    config.add_access_point(s, table.get_str(password).unwrap_or(""));
                }
                _ => {}
            }
        }

        if let Some(hostname) = table.get_str("NET_HOSTNAME").filter(|h| !h.is_empty()) {
            config.hostname = truncated(hostname);
        }
        if let Some(ssid) = table.get_str("NET_AP_SSID").filter(|s| !s.is_empty()) {
            config.soft_ap_ssid = truncated(ssid);
        }
        if let Some(password) = table.get_str("NET_AP_PASS") {
            config.soft_ap_password = truncated(password);
        }

        config.station_channel = table.get_u8("NET_STA_CHAN").unwrap_or(0);
        config.soft_ap_channel = table.get_u8("NET_AP_CHAN").unwrap_or(0);
        config.espnow_channel = table.get_u8("NET_NOW_CHAN").unwrap_or(0);

        if let (Some(ip), Some(mask)) = (table.get_u32("NET_AP_IP"), table.get_u32("NET_AP_MASK")) {
            config.soft_ap_ip = soft_ap_addressing(ip, mask);
        }

        if let Some(ms) = table.get_u32("NET_RETRY_MIN") {
            config.retry_min = Duration::from_millis(u64::from(ms));
        }
        if let Some(ms) = table.get_u32("NET_RETRY_MAX") {
            config.retry_max = Duration::from_millis(u64::from(ms));
        }

        let station = table.get_bool("NET_STA_ENABLE").unwrap_or(false)
            && !config.access_points.is_empty();
        Self {
            espnow: table.get_bool("NET_NOW_ENABLE").unwrap_or(false),
            soft_ap: table.get_bool("NET_AP_ENABLE").unwrap_or(false),
            station,
            config,
        }
    }

    /// Whether any personality is enabled
    pub fn any_enabled(&self) -> bool {
        self.espnow || self.soft_ap || self.station
    }
}

/// Soft-AP addressing from an interface address and netmask
///
/// The soft-AP is its own gateway and DNS server; the DHCP pool starts at the
/// next address.
fn soft_ap_addressing(ip: u32, mask: u32) -> SoftApIpConfig {
    let address = ip.to_be_bytes();
    SoftApIpConfig {
        ip: address,
        gateway: address,
        subnet: mask.to_be_bytes(),
        dhcp_start: ip.wrapping_add(1).to_be_bytes(),
        dns: address,
    }
}
