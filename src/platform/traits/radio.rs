//! Radio interface trait
//!
//! Narrow wrapper over the ESP32 WiFi driver and the ESP-NOW layer. The radio
//! coordinator drives every bring-up and teardown step through this trait and
//! never touches the SDK directly.
//!
//! # Shared Resources
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   ESP-NOW    │   │   Station    │   │   Soft-AP    │
//! └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!        └────────┬─────────┘                  │
//!                 ▼                            ▼
//!        STA interface (mode bit,     AP interface (mode bit,
//!        protocol bits)               protocol bits)
//!                 └──────────┬─────────────────┘
//!                            ▼
//!                one radio, one channel
//! ```

use crate::platform::Result;
use bitflags::bitflags;
use heapless::String;

/// Maximum SSID length (IEEE 802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length
pub const MAX_PASSWORD_LEN: usize = 63;

/// MAC address
pub type MacAddress = [u8; 6];

/// IPv4 address
pub type Ipv4 = [u8; 4];

bitflags! {
    /// Radio mode register
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RadioMode: u8 {
        /// Station interface enabled (used by station and ESP-NOW)
        const STATION = 0b01;
        /// Soft-AP interface enabled
        const SOFT_AP = 0b10;
    }
}

bitflags! {
    /// 802.11 protocol bits for one interface
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Protocols: u8 {
        /// 802.11b
        const B = 0b0001;
        /// 802.11g
        const G = 0b0010;
        /// 802.11n
        const N = 0b0100;
        /// Espressif long-range mode (ESP-NOW only)
        const LONG_RANGE = 0b1000;
        /// Standard b/g/n set
        const BGN = Self::B.bits() | Self::G.bits() | Self::N.bits();
    }
}

/// Network interface selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "esp32", derive(defmt::Format))]
pub enum Interface {
    /// Station interface (also carries ESP-NOW traffic)
    Station,
    /// Soft-AP interface
    SoftAp,
}

/// One access point from the last scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPointInfo {
    /// Network name
    pub ssid: String<MAX_SSID_LEN>,
    /// Hardware address of the access point
    pub bssid: MacAddress,
    /// Primary channel (1-14)
    pub channel: u8,
    /// Received signal strength in dBm
    pub rssi: i8,
}

/// Soft-AP addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftApIpConfig {
    /// Address of the soft-AP interface
    pub ip: Ipv4,
    /// Gateway handed out to clients
    pub gateway: Ipv4,
    /// Subnet mask
    pub subnet: Ipv4,
    /// First address of the DHCP pool
    pub dhcp_start: Ipv4,
    /// DNS server handed out to clients
    pub dns: Ipv4,
}

impl Default for SoftApIpConfig {
    fn default() -> Self {
        Self {
            ip: [192, 168, 4, 1],
            gateway: [192, 168, 4, 1],
            subnet: [255, 255, 255, 0],
            dhcp_start: [192, 168, 4, 2],
            dns: [192, 168, 4, 1],
        }
    }
}

/// Promiscuous-mode receive callback: raw frame and RSSI
pub type PromiscuousCallback = fn(frame: &[u8], rssi: i8);

/// ESP-NOW receive callback: sender address and payload
pub type EspNowRecvCallback = fn(sender: &MacAddress, data: &[u8]);

/// Radio interface trait
///
/// All calls are synchronous and expected to complete quickly; waiting for
/// asynchronous results (IP assignment, MAC population) is done by the caller
/// polling `local_ip` / `mac_address`.
pub trait RadioInterface {
    /// Write the radio mode register
    fn set_mode(&mut self, mode: RadioMode) -> Result<()>;

    /// Set the protocol bits of one interface
    fn set_protocol(&mut self, interface: Interface, protocols: Protocols) -> Result<()>;

    /// Channel the radio is currently tuned to
    fn channel(&self) -> Result<u8>;

    /// Tune the radio to `channel` (1-14)
    fn set_channel(&mut self, channel: u8) -> Result<()>;

    /// Run a blocking scan, returning the number of networks found
    ///
    /// # Errors
    ///
    /// Returns `RadioError::ScanFailed(code)` with the negative SDK code.
    fn scan_networks(&mut self) -> Result<usize>;

    /// Entry `index` of the last scan
    fn scan_result(&self, index: usize) -> Option<AccessPointInfo>;

    /// Release the memory held by the last scan
    fn clear_scan_results(&mut self);

    /// Set the DHCP hostname of an interface
    fn set_hostname(&mut self, interface: Interface, hostname: &str) -> Result<()>;

    /// Enable or disable the driver's own reconnect logic
    fn set_auto_reconnect(&mut self, enabled: bool) -> Result<()>;

    /// Start connecting the station to an access point
    fn connect(
        &mut self,
        ssid: &str,
        password: &str,
        channel: u8,
        bssid: Option<MacAddress>,
    ) -> Result<()>;

    /// Disconnect the station
    fn disconnect(&mut self) -> Result<()>;

    /// Station IPv4 address, once DHCP has completed
    fn local_ip(&self) -> Option<Ipv4>;

    /// MAC address of an interface; all zeros until the driver populates it
    fn mac_address(&self, interface: Interface) -> MacAddress;

    /// Create the soft-AP network
    fn ap_create(&mut self, ssid: &str, password: &str, channel: u8) -> Result<()>;

    /// Configure soft-AP addressing
    fn ap_config(&mut self, config: &SoftApIpConfig) -> Result<()>;

    /// Shut the soft-AP network down
    fn ap_stop(&mut self) -> Result<()>;

    /// Start the captive DNS server answering with `ip`
    fn dns_start(&mut self, ip: Ipv4) -> Result<()>;

    /// Stop the DNS server
    fn dns_stop(&mut self) -> Result<()>;

    /// Enable or disable promiscuous receive
    fn set_promiscuous(&mut self, enabled: bool) -> Result<()>;

    /// Install or remove the promiscuous receive callback
    fn set_promiscuous_rx_callback(&mut self, callback: Option<PromiscuousCallback>)
        -> Result<()>;

    /// Initialize the ESP-NOW layer
    fn esp_now_init(&mut self) -> Result<()>;

    /// Shut the ESP-NOW layer down
    fn esp_now_deinit(&mut self) -> Result<()>;

    /// Install or remove the ESP-NOW receive callback
    fn esp_now_register_recv_callback(&mut self, callback: Option<EspNowRecvCallback>)
        -> Result<()>;

    /// Add an ESP-NOW peer on `channel`
    fn esp_now_add_peer(&mut self, peer: &MacAddress, channel: u8) -> Result<()>;

    /// Remove an ESP-NOW peer
    fn esp_now_remove_peer(&mut self, peer: &MacAddress) -> Result<()>;

    /// Send an ESP-NOW frame
    fn esp_now_send(&mut self, peer: &MacAddress, data: &[u8]) -> Result<()>;
}
