//! Radio coordinator configuration

use crate::platform::traits::radio::{MAX_PASSWORD_LEN, MAX_SSID_LEN};
use crate::platform::traits::SoftApIpConfig;
use embassy_time::Duration;
use heapless::{String, Vec};

/// Access points the station may join, in preference order
pub const MAX_ACCESS_POINTS: usize = 4;

/// Maximum DHCP hostname length
pub const MAX_HOSTNAME_LEN: usize = 32;

/// Station wait for IP and MAC, in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u32 = 15_000;

/// Pause between teardown and bring-up, in milliseconds
pub const DEFAULT_SETTLE_DELAY_MS: u32 = 100;

/// Credentials of one access point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPointCredentials {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_PASSWORD_LEN>,
}

impl AccessPointCredentials {
    /// Build from string slices, truncating at the protocol limits
    pub fn new(ssid: &str, password: &str) -> Self {
        Self {
            ssid: truncated(ssid),
            password: truncated(password),
        }
    }
}

/// Copy `text` into a bounded string, dropping what does not fit
pub(crate) fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Everything the coordinator needs to bring the radio up
#[derive(Debug, Clone, PartialEq)]
pub struct RadioConfig {
    /// DHCP hostname of both interfaces
    pub hostname: String<MAX_HOSTNAME_LEN>,
    /// Fixed station channel, 0 to follow the access point found by the scan
    pub station_channel: u8,
    /// Access points to join, first match wins
    pub access_points: Vec<AccessPointCredentials, MAX_ACCESS_POINTS>,
    pub soft_ap_ssid: String<MAX_SSID_LEN>,
    pub soft_ap_password: String<MAX_PASSWORD_LEN>,
    /// Soft-AP channel, 0 for no preference
    pub soft_ap_channel: u8,
    pub soft_ap_ip: SoftApIpConfig,
    /// ESP-NOW channel, 0 for no preference
    pub espnow_channel: u8,
    /// Upper bound on waiting for station IP and MAC
    pub connect_timeout_ms: u32,
    pub settle_delay_ms: u32,
    /// First reconnect delay after the station drops
    pub retry_min: Duration,
    /// Reconnect delay ceiling
    pub retry_max: Duration,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            hostname: truncated("esp-robot"),
            station_channel: 0,
            access_points: Vec::new(),
            soft_ap_ssid: truncated("esp-robot"),
            soft_ap_password: String::new(),
            soft_ap_channel: 0,
            soft_ap_ip: SoftApIpConfig::default(),
            espnow_channel: 0,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            retry_min: Duration::from_secs(1),
            retry_max: Duration::from_secs(60),
        }
    }
}

impl RadioConfig {
    /// Append an access point; ignored once the list is full
    pub fn add_access_point(&mut self, ssid: &str, password: &str) -> bool {
        self.access_points
            .push(AccessPointCredentials::new(ssid, password))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_respects_capacity() {
        let s: String<4> = truncated("robotics");
        assert_eq!(s.as_str(), "robo");
    }

    #[test]
    fn test_access_point_list_is_bounded() {
        let mut config = RadioConfig::default();
        for i in 0..MAX_ACCESS_POINTS {
            assert!(config.add_access_point(if i == 0 { "a" } else { "b" }, "pw"));
        }
        assert!(!config.add_access_point("c", "pw"));
        assert_eq!(config.access_points.len(), MAX_ACCESS_POINTS);
    }

    #[test]
    fn test_defaults() {
        let config = RadioConfig::default();
        assert_eq!(config.connect_timeout_ms, 15_000);
        assert_eq!(config.soft_ap_ip.ip, [192, 168, 4, 1]);
        assert!(config.retry_min < config.retry_max);
    }
}
