//! Mock radio implementation for testing
//!
//! Records every call for verification (call-count spy) and supports failure
//! injection per call, configurable scan results, and delayed IP / MAC
//! population.

use crate::platform::{
    error::RadioError,
    traits::{
        AccessPointInfo, EspNowRecvCallback, Interface, Ipv4, MacAddress, PromiscuousCallback,
        Protocols, RadioInterface, RadioMode, SoftApIpConfig,
    },
    Result,
};
use core::cell::Cell;
use std::vec::Vec;

/// One recorded radio call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioCall {
    SetMode(RadioMode),
    SetProtocol(Interface, Protocols),
    SetChannel(u8),
    Scan,
    ClearScan,
    SetHostname(Interface),
    SetAutoReconnect(bool),
    Connect,
    Disconnect,
    ApCreate,
    ApConfig,
    ApStop,
    DnsStart,
    DnsStop,
    SetPromiscuous(bool),
    SetPromiscuousCallback(bool),
    EspNowInit,
    EspNowDeinit,
    EspNowRegisterCallback(bool),
    EspNowAddPeer,
    EspNowRemovePeer,
    EspNowSend,
}

/// Mock radio
#[derive(Debug)]
pub struct MockRadio {
    calls: Vec<RadioCall>,
    failures: Vec<RadioCall>,
    mode: RadioMode,
    station_protocols: Protocols,
    ap_protocols: Protocols,
    channel: u8,
    networks: Vec<AccessPointInfo>,
    scan_error: Option<i16>,
    scan_results: Vec<AccessPointInfo>,
    connected: bool,
    connected_ssid: Option<heapless::String<32>>,
    ip: Ipv4,
    /// `local_ip` polls still returning `None` after a connect
    ip_delay_polls: Cell<u32>,
    ip_never: bool,
    mac: MacAddress,
    mac_populated: bool,
    ap_running: bool,
    dns_running: bool,
    promiscuous: bool,
    promiscuous_callback: bool,
    esp_now_running: bool,
    peers: Vec<MacAddress>,
    sent: Vec<(MacAddress, Vec<u8>)>,
    hostname: Option<heapless::String<32>>,
    auto_reconnect: bool,
}

impl MockRadio {
    /// Create a mock radio tuned to channel 1 with no visible networks
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            failures: Vec::new(),
            mode: RadioMode::empty(),
            station_protocols: Protocols::BGN,
            ap_protocols: Protocols::BGN,
            channel: 1,
            networks: Vec::new(),
            scan_error: None,
            scan_results: Vec::new(),
            connected: false,
            connected_ssid: None,
            ip: [192, 168, 1, 50],
            ip_delay_polls: Cell::new(0),
            ip_never: false,
            mac: [0x24, 0x6f, 0x28, 0x01, 0x02, 0x03],
            mac_populated: true,
            ap_running: false,
            dns_running: false,
            promiscuous: false,
            promiscuous_callback: false,
            esp_now_running: false,
            peers: Vec::new(),
            sent: Vec::new(),
            hostname: None,
            auto_reconnect: true,
        }
    }

    /// Make a network visible to scans
    pub fn add_network(&mut self, ssid: &str, channel: u8, rssi: i8) {
        let mut name = heapless::String::new();
        name.push_str(ssid).ok();
        let index = self.networks.len() as u8;
        self.networks.push(AccessPointInfo {
            ssid: name,
            bssid: [0x10, 0x20, 0x30, 0x40, 0x50, index],
            channel,
            rssi,
        });
    }

    /// Make the next scans fail with `code`
    pub fn set_scan_error(&mut self, code: Option<i16>) {
        self.scan_error = code;
    }

    /// Fail every call equal to `call` until `clear_failures`
    pub fn inject_failure(&mut self, call: RadioCall) {
        self.failures.push(call);
    }

    /// Remove all injected failures
    pub fn clear_failures(&mut self) {
        self.failures.clear();
    }

    /// Delay the station IP by `polls` calls to `local_ip`
    pub fn set_ip_delay(&mut self, polls: u32) {
        self.ip_delay_polls.set(polls);
    }

    /// Never hand out a station IP
    pub fn set_ip_never(&mut self, never: bool) {
        self.ip_never = never;
    }

    /// Whether the driver reports a MAC address
    pub fn set_mac_populated(&mut self, populated: bool) {
        self.mac_populated = populated;
    }

    /// Simulate the access point dropping the station
    pub fn drop_station(&mut self) {
        self.connected = false;
        self.connected_ssid = None;
    }

    /// All calls recorded so far
    pub fn calls(&self) -> &[RadioCall] {
        &self.calls
    }

    /// Number of calls recorded so far
    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// Number of recorded calls equal to `call`
    pub fn count_of(&self, call: RadioCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    /// Forget recorded calls
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Current mode register
    pub fn mode(&self) -> RadioMode {
        self.mode
    }

    /// Protocol bits of the station interface
    pub fn station_protocols(&self) -> Protocols {
        self.station_protocols
    }

    /// Protocol bits of the soft-AP interface
    pub fn ap_protocols(&self) -> Protocols {
        self.ap_protocols
    }

    /// Whether a promiscuous receive callback is installed
    pub fn has_promiscuous_callback(&self) -> bool {
        self.promiscuous_callback
    }

    /// Whether the station is associated
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// SSID the station is associated with
    pub fn connected_ssid(&self) -> Option<&str> {
        self.connected_ssid.as_ref().map(|s| s.as_str())
    }

    /// Whether the soft-AP network is up
    pub fn is_ap_running(&self) -> bool {
        self.ap_running
    }

    /// Whether the DNS server is up
    pub fn is_dns_running(&self) -> bool {
        self.dns_running
    }

    /// Whether promiscuous receive is on
    pub fn is_promiscuous(&self) -> bool {
        self.promiscuous
    }

    /// Whether the ESP-NOW layer is initialized
    pub fn is_esp_now_running(&self) -> bool {
        self.esp_now_running
    }

    /// Whether the driver reconnects on its own
    pub fn auto_reconnect(&self) -> bool {
        self.auto_reconnect
    }

    /// Last hostname set on any interface
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_ref().map(|s| s.as_str())
    }

    /// Registered ESP-NOW peers
    pub fn peers(&self) -> &[MacAddress] {
        &self.peers
    }

    /// ESP-NOW frames sent so far
    pub fn sent(&self) -> &[(MacAddress, Vec<u8>)] {
        &self.sent
    }

    fn record(&mut self, call: RadioCall, error: RadioError) -> Result<()> {
        self.calls.push(call);
        if self.failures.contains(&call) {
            return Err(error.into());
        }
        Ok(())
    }
}

impl Default for MockRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioInterface for MockRadio {
    fn set_mode(&mut self, mode: RadioMode) -> Result<()> {
        self.record(RadioCall::SetMode(mode), RadioError::ModeFailed)?;
        self.mode = mode;
        if !mode.contains(RadioMode::STATION) {
            self.connected = false;
            self.connected_ssid = None;
        }
        if !mode.contains(RadioMode::SOFT_AP) {
            self.ap_running = false;
        }
        Ok(())
    }

    fn set_protocol(&mut self, interface: Interface, protocols: Protocols) -> Result<()> {
        self.record(
            RadioCall::SetProtocol(interface, protocols),
            RadioError::ProtocolFailed,
        )?;
        match interface {
            Interface::Station => self.station_protocols = protocols,
            Interface::SoftAp => self.ap_protocols = protocols,
        }
        Ok(())
    }

    fn channel(&self) -> Result<u8> {
        Ok(self.channel)
    }

    fn set_channel(&mut self, channel: u8) -> Result<()> {
        self.record(RadioCall::SetChannel(channel), RadioError::InvalidChannel)?;
        if !(1..=14).contains(&channel) {
            return Err(RadioError::InvalidChannel.into());
        }
        self.channel = channel;
        Ok(())
    }

    fn scan_networks(&mut self) -> Result<usize> {
        self.record(RadioCall::Scan, RadioError::ScanFailed(-1))?;
        if let Some(code) = self.scan_error {
            return Err(RadioError::ScanFailed(code).into());
        }
        self.scan_results = self.networks.clone();
        Ok(self.scan_results.len())
    }

    fn scan_result(&self, index: usize) -> Option<AccessPointInfo> {
        self.scan_results.get(index).cloned()
    }

    fn clear_scan_results(&mut self) {
        self.calls.push(RadioCall::ClearScan);
        self.scan_results.clear();
    }

    fn set_hostname(&mut self, interface: Interface, hostname: &str) -> Result<()> {
        self.record(RadioCall::SetHostname(interface), RadioError::HostnameFailed)?;
        let mut name = heapless::String::new();
        name.push_str(hostname)
            .map_err(|_| RadioError::HostnameFailed)?;
        self.hostname = Some(name);
        Ok(())
    }

    fn set_auto_reconnect(&mut self, enabled: bool) -> Result<()> {
        self.record(
            RadioCall::SetAutoReconnect(enabled),
            RadioError::ConnectFailed,
        )?;
        self.auto_reconnect = enabled;
        Ok(())
    }

    fn connect(
        &mut self,
        ssid: &str,
        _password: &str,
        channel: u8,
        _bssid: Option<MacAddress>,
    ) -> Result<()> {
        self.record(RadioCall::Connect, RadioError::ConnectFailed)?;
        if !self.mode.contains(RadioMode::STATION) {
            return Err(RadioError::ConnectFailed.into());
        }
        if channel != 0 {
            self.channel = channel;
        }
        let mut name = heapless::String::new();
        name.push_str(ssid).map_err(|_| RadioError::ConnectFailed)?;
        self.connected = true;
        self.connected_ssid = Some(name);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.record(RadioCall::Disconnect, RadioError::DisconnectFailed)?;
        self.connected = false;
        self.connected_ssid = None;
        Ok(())
    }

    fn local_ip(&self) -> Option<Ipv4> {
        if !self.connected || self.ip_never {
            return None;
        }
        let remaining = self.ip_delay_polls.get();
        if remaining > 0 {
            self.ip_delay_polls.set(remaining - 1);
            return None;
        }
        Some(self.ip)
    }

    fn mac_address(&self, interface: Interface) -> MacAddress {
        if !self.mac_populated {
            return [0; 6];
        }
        let mut mac = self.mac;
        if interface == Interface::SoftAp {
            mac[5] = mac[5].wrapping_add(1);
        }
        mac
    }

    fn ap_create(&mut self, _ssid: &str, _password: &str, channel: u8) -> Result<()> {
        self.record(RadioCall::ApCreate, RadioError::AccessPointFailed)?;
        if !self.mode.contains(RadioMode::SOFT_AP) {
            return Err(RadioError::AccessPointFailed.into());
        }
        self.channel = channel;
        self.ap_running = true;
        Ok(())
    }

    fn ap_config(&mut self, _config: &SoftApIpConfig) -> Result<()> {
        self.record(RadioCall::ApConfig, RadioError::AccessPointFailed)
    }

    fn ap_stop(&mut self) -> Result<()> {
        self.record(RadioCall::ApStop, RadioError::AccessPointFailed)?;
        self.ap_running = false;
        Ok(())
    }

    fn dns_start(&mut self, _ip: Ipv4) -> Result<()> {
        self.record(RadioCall::DnsStart, RadioError::DnsFailed)?;
        self.dns_running = true;
        Ok(())
    }

    fn dns_stop(&mut self) -> Result<()> {
        self.record(RadioCall::DnsStop, RadioError::DnsFailed)?;
        self.dns_running = false;
        Ok(())
    }

    fn set_promiscuous(&mut self, enabled: bool) -> Result<()> {
        self.record(
            RadioCall::SetPromiscuous(enabled),
            RadioError::PromiscuousFailed,
        )?;
        self.promiscuous = enabled;
        Ok(())
    }

    fn set_promiscuous_rx_callback(
        &mut self,
        callback: Option<PromiscuousCallback>,
    ) -> Result<()> {
        self.record(
            RadioCall::SetPromiscuousCallback(callback.is_some()),
            RadioError::PromiscuousFailed,
        )?;
        self.promiscuous_callback = callback.is_some();
        Ok(())
    }

    fn esp_now_init(&mut self) -> Result<()> {
        self.record(RadioCall::EspNowInit, RadioError::EspNowFailed)?;
        self.esp_now_running = true;
        Ok(())
    }

    fn esp_now_deinit(&mut self) -> Result<()> {
        self.record(RadioCall::EspNowDeinit, RadioError::EspNowFailed)?;
        self.esp_now_running = false;
        self.peers.clear();
        Ok(())
    }

    fn esp_now_register_recv_callback(
        &mut self,
        callback: Option<EspNowRecvCallback>,
    ) -> Result<()> {
        self.record(
            RadioCall::EspNowRegisterCallback(callback.is_some()),
            RadioError::EspNowFailed,
        )
    }

    fn esp_now_add_peer(&mut self, peer: &MacAddress, _channel: u8) -> Result<()> {
        self.record(RadioCall::EspNowAddPeer, RadioError::EspNowFailed)?;
        if !self.esp_now_running {
            return Err(RadioError::EspNowFailed.into());
        }
        if !self.peers.contains(peer) {
            self.peers.push(*peer);
        }
        Ok(())
    }

    fn esp_now_remove_peer(&mut self, peer: &MacAddress) -> Result<()> {
        self.record(RadioCall::EspNowRemovePeer, RadioError::EspNowFailed)?;
        self.peers.retain(|p| p != peer);
        Ok(())
    }

    fn esp_now_send(&mut self, peer: &MacAddress, data: &[u8]) -> Result<()> {
        self.record(RadioCall::EspNowSend, RadioError::EspNowFailed)?;
        if !self.esp_now_running {
            return Err(RadioError::EspNowFailed.into());
        }
        self.sent.push((*peer, data.to_vec()));
        Ok(())
    }
}
