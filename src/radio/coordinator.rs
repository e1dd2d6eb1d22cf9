//! Radio coordinator
//!
//! Multiplexes the ESP-NOW, soft-AP and station personalities over one radio.
//! `enable` turns a desired end state into the components to stop and start;
//! `stop_start` arbitrates the channel, tears down, waits for the radio to
//! settle and brings up in dependency order.
//!
//! # Sequencing
//!
//! ```text
//! teardown:  ESP-NOW (online, layer, promiscuous, callback, channel)
//!            Station (online, disconnect, auto-reconnect, hostname, AP, channel, scan)
//!            Soft-AP (online, DNS, hostname, IP, SSID, channel)
//!            protocol, mode
//! settle
//! bring-up:  mode, protocol, scan, AP select, channel finalize,
//!            Soft-AP steps, Station steps, ESP-NOW steps
//! ```
//!
//! A failing step aborts the rest of the sequence. Nothing is rolled back:
//! the component set always mirrors what the radio actually did. Scan and
//! AP-selection failures only prune the station steps.

use super::backoff::ReconnectBackoff;
use super::channel::{arbitrate, preferred_channel, ChannelRule};
use super::component::{is_online, personality_active, Component, Components, Personality};
use super::config::RadioConfig;
use super::error::StopStartError;
use super::events::{RadioEvent, RadioEvents};
use super::state::{RadioCoordinatorState, SelectedAp};
use crate::core::display::reborrow;
use crate::platform::traits::{
    EspNowRecvCallback, Interface, Ipv4, MacAddress, Protocols, RadioInterface, RadioMode,
    TimerInterface,
};
use crate::platform::{PlatformError, RadioError, Result};
use crate::{display, log_debug, log_error, log_info, log_trace, log_warn};
use core::fmt::Write;
use core::sync::atomic::{AtomicI8, Ordering};
use embassy_time::{Duration, Instant};

/// Poll interval while waiting for station IP / MAC
const WAIT_POLL_MS: u32 = 100;

/// RSSI of the last frame seen in promiscuous mode; `i8::MIN` before any
static LAST_RSSI: AtomicI8 = AtomicI8::new(i8::MIN);

fn promiscuous_rx(_frame: &[u8], rssi: i8) {
    LAST_RSSI.store(rssi, Ordering::Relaxed);
}

/// Signal strength of the last frame received in promiscuous mode
pub fn last_rssi() -> Option<i8> {
    match LAST_RSSI.load(Ordering::Relaxed) {
        i8::MIN => None,
        rssi => Some(rssi),
    }
}

/// Mode register value needed by the components in `set`
fn mode_for(set: Components) -> RadioMode {
    let mut mode = RadioMode::empty();
    if set.intersects(Components::STATION_INTERFACE) {
        mode |= RadioMode::STATION;
    }
    if set.contains(Components::SOFT_AP_MODE) {
        mode |= RadioMode::SOFT_AP;
    }
    mode
}

/// Station-interface protocol bits needed by the components in `set`
fn station_protocols_for(set: Components) -> Option<Protocols> {
    if set.contains(Components::ESPNOW_PROTOCOL) {
        Some(Protocols::BGN | Protocols::LONG_RANGE)
    } else if set.contains(Components::STATION_PROTOCOL) {
        Some(Protocols::BGN)
    } else {
        None
    }
}

type StepResult = core::result::Result<(), (Component, PlatformError)>;

/// Radio coordinator
///
/// Owns the radio and timer collaborators and the component state. Hardware
/// events reach it only through the `RadioEvents` queue drained by `poll`.
pub struct RadioCoordinator<'a, R: RadioInterface, T: TimerInterface> {
    radio: R,
    timer: T,
    config: RadioConfig,
    state: RadioCoordinatorState,
    backoff: ReconnectBackoff,
    events: &'a RadioEvents,
    esp_now_receiver: Option<EspNowRecvCallback>,
}

impl<'a, R: RadioInterface, T: TimerInterface> RadioCoordinator<'a, R, T> {
    pub fn new(radio: R, timer: T, config: RadioConfig, events: &'a RadioEvents) -> Self {
        let backoff = ReconnectBackoff::new(config.retry_min, config.retry_max);
        Self {
            radio,
            timer,
            config,
            state: RadioCoordinatorState::new(),
            backoff,
            events,
            esp_now_receiver: None,
        }
    }

    /// Callback installed when the ESP-NOW layer starts
    pub fn set_esp_now_receiver(&mut self, receiver: Option<EspNowRecvCallback>) {
        self.esp_now_receiver = receiver;
    }

    /// Replace the configuration
    ///
    /// Takes effect at the next `enable`; resets the reconnect backoff.
    pub fn apply_config(&mut self, config: RadioConfig) {
        self.backoff = ReconnectBackoff::new(config.retry_min, config.retry_max);
        self.config = config;
        log_info!("radio: configuration updated");
    }

    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    pub fn state(&self) -> &RadioCoordinatorState {
        &self.state
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Active components
    pub fn started(&self) -> Components {
        self.state.started
    }

    /// Channel in use, 0 when nothing is online
    pub fn channel(&self) -> u8 {
        self.state.channel
    }

    pub fn is_using_default_channel(&self) -> bool {
        self.state.use_default_channel
    }

    pub fn is_online(&self, personality: Personality) -> bool {
        is_online(self.state.started, personality)
    }

    pub fn station_ip(&self) -> Option<Ipv4> {
        self.state.station_ip
    }

    /// Whether a station reconnect is waiting for `poll`
    pub fn reconnect_pending(&self) -> bool {
        self.state.reconnect_requested
    }

    /// Delay the next reconnect attempt will wait
    pub fn reconnect_delay(&self) -> Duration {
        self.backoff.current()
    }

    /// Bring the radio to the requested set of online personalities
    pub fn enable(
        &mut self,
        espnow: bool,
        soft_ap: bool,
        station: bool,
        display: Option<&mut dyn Write>,
    ) -> core::result::Result<(), StopStartError> {
        let mut stopping = Components::empty();
        let mut starting = Components::empty();
        let mut wanted = Components::empty();
        for (personality, want) in [
            (Personality::EspNow, espnow),
            (Personality::SoftAp, soft_ap),
            (Personality::Station, station),
        ] {
            if want {
                wanted |= personality.components();
                if !is_online(self.state.started, personality) {
                    starting |= personality.components();
                }
            } else if personality_active(self.state.started, personality) {
                stopping |= personality.components();
            }
        }
        self.state.wanted = wanted;
        if !station {
            self.state.cancel_reconnect();
        }
        log_info!(
            "radio: enable espnow={} softap={} station={}",
            espnow,
            soft_ap,
            station
        );
        self.stop_start(stopping, starting, display)
    }

    /// Stop the components in `stopping`, then start those in `starting`
    pub fn stop_start(
        &mut self,
        mut stopping: Components,
        mut starting: Components,
        mut display: Option<&mut dyn Write>,
    ) -> core::result::Result<(), StopStartError> {
        let active = self.state.started;

        let plan = arbitrate(
            active,
            stopping,
            starting,
            self.state.channel,
            self.state.use_default_channel,
            &self.config,
        );
        if !plan.restart.is_empty() {
            log_info!(
                "radio: channel {} -> {}, restarting {:#x}",
                self.state.channel,
                plan.channel,
                plan.restart.bits()
            );
            stopping |= plan.restart;
            starting |= plan.restart;
        }

        stopping &= active;
        starting &= !(active & !stopping);
        if stopping.is_empty() && starting.is_empty() {
            log_debug!("radio: nothing to do");
            return Ok(());
        }
        log_debug!(
            "radio: stopping {:#x} starting {:#x}",
            stopping.bits(),
            starting.bits()
        );

        if !stopping.is_empty() {
            if let Err((component, e)) = self.teardown(stopping) {
                let stuck = stopping & self.state.started;
                log_error!("radio: stopping {} failed: {}", component.name(), e);
                display!(display, "Radio: stopping {} failed: {}", component.name(), e);
                return Err(StopStartError::NotStopped(stuck));
            }
        }

        self.state.channel = plan.channel;
        self.state.use_default_channel = plan.use_default;
        if plan.rule != ChannelRule::KeepCurrent {
            log_info!("radio: channel {} ({:?})", plan.channel, plan.rule);
        }

        if !stopping.is_empty() && !starting.is_empty() {
            if let Err(e) = self.timer.delay_ms(self.config.settle_delay_ms) {
                log_warn!("radio: settle delay failed: {}", e);
            }
        }

        if !starting.is_empty() {
            if let Err((component, e)) = self.bring_up(starting, reborrow(&mut display)) {
                log_error!("radio: starting {} failed: {}", component.name(), e);
                display!(display, "Radio: starting {} failed: {}", component.name(), e);
            }
        }

        if !self.state.any_online() {
            self.state.channel = 0;
            self.state.use_default_channel = true;
        }

        if starting.contains(Components::STATION_ONLINE) {
            if self.is_online(Personality::Station) {
                self.backoff.reset();
                self.state.cancel_reconnect();
            } else if self.state.wants(Personality::Station) {
                log_warn!("radio: station not online, scheduling reconnect");
                self.state.reconnect_requested = true;
            }
        }

        let missing = starting & !self.state.started;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(StopStartError::NotStarted(missing))
        }
    }

    /// Drain hardware events and service a pending station reconnect
    pub fn poll(
        &mut self,
        now: Instant,
        mut display: Option<&mut dyn Write>,
    ) -> core::result::Result<(), StopStartError> {
        while let Some(event) = self.events.try_receive() {
            self.handle_event(event, reborrow(&mut display));
        }

        if !self.state.reconnect_requested {
            return Ok(());
        }
        if !self.state.wants(Personality::Station) {
            self.state.cancel_reconnect();
            return Ok(());
        }

        match self.state.next_reconnect {
            None => {
                let delay = self.backoff.current();
                log_info!("radio: station reconnect in {} ms", delay.as_millis());
                self.state.next_reconnect = Some(now + delay);
                Ok(())
            }
            Some(due) if now < due => Ok(()),
            Some(_) => {
                self.state.next_reconnect = None;
                log_info!("radio: reconnecting station");
                let stopping = self.state.started & Components::STATION;
                let result = self.stop_start(stopping, Components::STATION, reborrow(&mut display));
                if !self.is_online(Personality::Station) {
                    let delay = self.backoff.advance();
                    log_warn!("radio: reconnect failed, next attempt in {} ms", delay.as_millis());
                    display!(display, "Station reconnect failed, retry in {} ms", delay.as_millis());
                    self.state.reconnect_requested = true;
                    self.state.next_reconnect = Some(now + delay);
                }
                result
            }
        }
    }

    fn handle_event(&mut self, event: RadioEvent, mut display: Option<&mut dyn Write>) {
        match event {
            RadioEvent::StationConnected => log_debug!("radio: station associated"),
            RadioEvent::StationDisconnected => {
                let lost = Components::STATION_CONNECT | Components::STATION_ONLINE;
                if self.state.started.intersects(lost) {
                    self.state.started.remove(lost);
                    self.state.station_ip = None;
                    log_warn!("radio: station disconnected");
                    display!(display, "Station disconnected");
                    if self.state.wants(Personality::Station) {
                        self.state.reconnect_requested = true;
                    }
                }
            }
            RadioEvent::StationGotIp(ip) => {
                self.state.station_ip = Some(ip);
                log_info!("radio: station IP {}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]);
            }
            RadioEvent::ScanDone(count) => log_debug!("radio: scan found {} networks", count),
            RadioEvent::SoftApStarted => log_debug!("radio: soft-AP started"),
            RadioEvent::SoftApStopped => {
                if self.state.started.contains(Components::SOFT_AP_ONLINE) {
                    self.state.started.remove(Components::SOFT_AP_ONLINE);
                    log_warn!("radio: soft-AP stopped unexpectedly");
                    display!(display, "Soft-AP stopped");
                }
            }
            RadioEvent::EspNowSendComplete { success, .. } => {
                if success {
                    log_trace!("radio: ESP-NOW frame delivered");
                } else {
                    log_warn!("radio: ESP-NOW frame not acknowledged");
                }
            }
        }
    }

    fn needs_stop(&self, stopping: Components, component: Component) -> bool {
        stopping.contains(component.bit()) && self.state.started.contains(component.bit())
    }

    fn record_stop(&mut self, component: Component, result: Result<()>) -> StepResult {
        result.map_err(|e| (component, e))?;
        self.state.started.remove(component.bit());
        log_trace!("radio: stopped {}", component.name());
        Ok(())
    }

    /// Bookkeeping-only teardown step
    fn clear(&mut self, stopping: Components, component: Component) {
        if self.needs_stop(stopping, component) {
            self.state.started.remove(component.bit());
            log_trace!("radio: stopped {}", component.name());
        }
    }

    fn teardown(&mut self, stopping: Components) -> StepResult {
        // ESP-NOW
        self.clear(stopping, Component::EspNowOnline);
        if self.needs_stop(stopping, Component::EspNowLayer) {
            let r = self.radio.esp_now_deinit();
            self.record_stop(Component::EspNowLayer, r)?;
        }
        if self.needs_stop(stopping, Component::EspNowPromiscuousMode) {
            let r = self.radio.set_promiscuous(false);
            self.record_stop(Component::EspNowPromiscuousMode, r)?;
        }
        if self.needs_stop(stopping, Component::EspNowPromiscuousCallback) {
            let r = self.radio.set_promiscuous_rx_callback(None);
            self.record_stop(Component::EspNowPromiscuousCallback, r)?;
        }
        self.clear(stopping, Component::EspNowChannelSet);
        self.clear(stopping, Component::EspNowChannelSelect);

        // Station
        if self.needs_stop(stopping, Component::StationOnline) {
            self.state.station_ip = None;
            self.clear(stopping, Component::StationOnline);
        }
        if self.needs_stop(stopping, Component::StationConnect) {
            let r = self.radio.disconnect();
            self.record_stop(Component::StationConnect, r)?;
        }
        self.clear(stopping, Component::StationAutoReconnect);
        self.clear(stopping, Component::StationHostname);
        if self.needs_stop(stopping, Component::StationApSelect) {
            self.state.selected_ap = None;
            self.clear(stopping, Component::StationApSelect);
        }
        self.clear(stopping, Component::StationChannelSelect);
        if self.needs_stop(stopping, Component::StationScan) {
            self.radio.clear_scan_results();
            self.clear(stopping, Component::StationScan);
        }

        // Soft-AP
        self.clear(stopping, Component::SoftApOnline);
        if self.needs_stop(stopping, Component::SoftApDnsServer) {
            let r = self.radio.dns_stop();
            self.record_stop(Component::SoftApDnsServer, r)?;
        }
        self.clear(stopping, Component::SoftApHostname);
        self.clear(stopping, Component::SoftApIpConfig);
        if self.needs_stop(stopping, Component::SoftApSsidPassword) {
            let r = self.radio.ap_stop();
            self.record_stop(Component::SoftApSsidPassword, r)?;
        }
        self.clear(stopping, Component::SoftApChannelSelect);

        // Long range stays on the station interface only while ESP-NOW runs
        let station_protocol_bits = stopping
            & self.state.started
            & (Components::ESPNOW_PROTOCOL | Components::STATION_PROTOCOL);
        if !station_protocol_bits.is_empty() {
            let current = station_protocols_for(self.state.started);
            let remaining = station_protocols_for(self.state.started & !station_protocol_bits);
            if let Some(protocols) = remaining.filter(|r| Some(*r) != current) {
                let r = self.radio.set_protocol(Interface::Station, protocols);
                let first = station_protocol_bits
                    .components()
                    .next()
                    .unwrap_or(Component::EspNowProtocol);
                r.map_err(|e| (first, e))?;
                log_debug!("radio: station protocols {:#x}", protocols.bits());
            }
        }
        for component in (stopping & Components::PROTOCOL).components() {
            self.clear(stopping, component);
        }

        let mode_bits = stopping & self.state.started & Components::MODE;
        if !mode_bits.is_empty() {
            let current = mode_for(self.state.started);
            let remaining = mode_for(self.state.started & !mode_bits);
            if remaining != current {
                let r = self.radio.set_mode(remaining);
                let first = mode_bits.components().next().unwrap_or(Component::StationMode);
                r.map_err(|e| (first, e))?;
                log_debug!("radio: mode {:#x}", remaining.bits());
            }
            self.state.started.remove(mode_bits);
        }
        Ok(())
    }

    fn needs_start(&self, pending: Components, component: Component) -> bool {
        pending.contains(component.bit()) && !self.state.started.contains(component.bit())
    }

    fn record_start(&mut self, component: Component, result: Result<()>) -> StepResult {
        result.map_err(|e| (component, e))?;
        self.state.started.insert(component.bit());
        log_trace!("radio: started {}", component.name());
        Ok(())
    }

    fn bring_up(&mut self, requested: Components, mut display: Option<&mut dyn Write>) -> StepResult {
        let mut pending = requested;

        let mode_bits = pending & Components::MODE & !self.state.started;
        if !mode_bits.is_empty() {
            let current = mode_for(self.state.started);
            let target = mode_for(self.state.started | pending);
            if target != current {
                let r = self.radio.set_mode(target);
                let first = mode_bits.components().next().unwrap_or(Component::StationMode);
                r.map_err(|e| (first, e))?;
                log_debug!("radio: mode {:#x}", target.bits());
            }
            self.state.started.insert(mode_bits);
        }

        let station_protocol_bits =
            pending & (Components::ESPNOW_PROTOCOL | Components::STATION_PROTOCOL) & !self.state.started;
        if !station_protocol_bits.is_empty() {
            let current = station_protocols_for(self.state.started);
            let target = station_protocols_for(self.state.started | pending);
            if let Some(protocols) = target.filter(|t| Some(*t) != current) {
                let r = self.radio.set_protocol(Interface::Station, protocols);
                let first = station_protocol_bits
                    .components()
                    .next()
                    .unwrap_or(Component::StationProtocol);
                r.map_err(|e| (first, e))?;
            }
            self.state.started.insert(station_protocol_bits);
        }
        if self.needs_start(pending, Component::SoftApProtocol) {
            let r = self.radio.set_protocol(Interface::SoftAp, Protocols::BGN);
            self.record_start(Component::SoftApProtocol, r)?;
        }

        if self.needs_start(pending, Component::StationScan) {
            match self.radio.scan_networks() {
                Ok(count) => {
                    log_info!("radio: scan found {} networks", count);
                    self.state.started.insert(Components::STATION_SCAN);
                }
                Err(e) => {
                    log_warn!("radio: scan failed: {}", e);
                    display!(display, "WiFi scan failed: {}", e);
                    pending.remove(Components::STATION);
                }
            }
        }

        if self.needs_start(pending, Component::StationApSelect) {
            match self.select_access_point() {
                Some(selected) => {
                    log_info!(
                        "radio: selected {} on channel {}",
                        selected.info.ssid.as_str(),
                        selected.info.channel
                    );
                    self.state.selected_ap = Some(selected);
                    self.state.started.insert(Components::STATION_AP_SELECT);
                }
                None => {
                    log_warn!("radio: no configured access point found");
                    display!(display, "No configured access point in range");
                    pending.remove(Components::STATION);
                }
            }
        }

        self.finalize_channel(pending);

        // Soft-AP
        if self.needs_start(pending, Component::SoftApChannelSelect) {
            self.record_start(Component::SoftApChannelSelect, Ok(()))?;
        }
        if self.needs_start(pending, Component::SoftApSsidPassword) {
            let r = self.radio.ap_create(
                &self.config.soft_ap_ssid,
                &self.config.soft_ap_password,
                self.state.channel,
            );
            self.record_start(Component::SoftApSsidPassword, r)?;
        }
        if self.needs_start(pending, Component::SoftApIpConfig) {
            let r = self.radio.ap_config(&self.config.soft_ap_ip);
            self.record_start(Component::SoftApIpConfig, r)?;
        }
        if self.needs_start(pending, Component::SoftApHostname) {
            let r = self.radio.set_hostname(Interface::SoftAp, &self.config.hostname);
            self.record_start(Component::SoftApHostname, r)?;
        }
        if self.needs_start(pending, Component::SoftApDnsServer) {
            let r = self.radio.dns_start(self.config.soft_ap_ip.ip);
            self.record_start(Component::SoftApDnsServer, r)?;
        }
        if self.needs_start(pending, Component::SoftApOnline) {
            self.record_start(Component::SoftApOnline, Ok(()))?;
            log_info!("radio: soft-AP online on channel {}", self.state.channel);
        }

        // Station
        if self.needs_start(pending, Component::StationChannelSelect) {
            self.record_start(Component::StationChannelSelect, Ok(()))?;
        }
        if self.needs_start(pending, Component::StationHostname) {
            let r = self.radio.set_hostname(Interface::Station, &self.config.hostname);
            self.record_start(Component::StationHostname, r)?;
        }
        if self.needs_start(pending, Component::StationAutoReconnect) {
            let r = self.radio.set_auto_reconnect(false);
            self.record_start(Component::StationAutoReconnect, r)?;
        }
        if self.needs_start(pending, Component::StationConnect) {
            let r = self.connect_station();
            self.record_start(Component::StationConnect, r)?;
        }
        if self.needs_start(pending, Component::StationOnline) {
            let r = self.wait_for_station();
            let r = r.map(|ip| {
                self.state.station_ip = Some(ip);
                log_info!("radio: station online, IP {}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]);
            });
            self.record_start(Component::StationOnline, r)?;
        }

        // ESP-NOW
        if self.needs_start(pending, Component::EspNowChannelSelect) {
            let r = self.radio.channel().map(|_| ());
            self.record_start(Component::EspNowChannelSelect, r)?;
        }
        if self.needs_start(pending, Component::EspNowChannelSet) {
            let wanted = self.state.channel;
            let r = self.radio.channel().and_then(|actual| {
                if actual != wanted && wanted != 0 {
                    self.radio.set_channel(wanted)
                } else {
                    Ok(())
                }
            });
            self.record_start(Component::EspNowChannelSet, r)?;
        }
        if self.needs_start(pending, Component::EspNowPromiscuousCallback) {
            let r = self.radio.set_promiscuous_rx_callback(Some(promiscuous_rx));
            self.record_start(Component::EspNowPromiscuousCallback, r)?;
        }
        if self.needs_start(pending, Component::EspNowPromiscuousMode) {
            let r = self.radio.set_promiscuous(true);
            self.record_start(Component::EspNowPromiscuousMode, r)?;
        }
        if self.needs_start(pending, Component::EspNowLayer) {
            let receiver = self.esp_now_receiver;
            let r = self.radio.esp_now_init().and_then(|_| match receiver {
                Some(cb) => self.radio.esp_now_register_recv_callback(Some(cb)),
                None => Ok(()),
            });
            self.record_start(Component::EspNowLayer, r)?;
        }
        if self.needs_start(pending, Component::EspNowOnline) {
            let deadline = self.timer.now_ms() + u64::from(self.config.connect_timeout_ms);
            let r = self.wait_for_mac(deadline);
            self.record_start(Component::EspNowOnline, r)?;
            log_info!("radio: ESP-NOW online on channel {}", self.state.channel);
        }
        Ok(())
    }

    /// Settle an unset channel once the scan result is known
    fn finalize_channel(&mut self, pending: Components) {
        if self.state.channel != 0 {
            return;
        }
        let station_ap = self
            .state
            .selected_ap
            .as_ref()
            .filter(|_| pending.contains(Components::STATION_ONLINE))
            .map(|selected| selected.info.channel);
        let (channel, rule) = match station_ap {
            Some(channel) => (channel, ChannelRule::Scan),
            None => {
                let will_be = self.state.started | pending;
                preferred_channel(&self.config, |p| is_online(will_be, p))
            }
        };
        self.state.channel = channel;
        self.state.use_default_channel = rule == ChannelRule::Default;
        log_info!("radio: channel {} ({:?})", channel, rule);
    }

    /// Best-signal scan entry for the first configured access point in range
    fn select_access_point(&self) -> Option<SelectedAp> {
        let fixed = self.state.channel;
        for (credentials, ap) in self.config.access_points.iter().enumerate() {
            let mut best: Option<SelectedAp> = None;
            let mut index = 0;
            while let Some(info) = self.radio.scan_result(index) {
                index += 1;
                if info.ssid != ap.ssid || (fixed != 0 && info.channel != fixed) {
                    continue;
                }
                if best.as_ref().is_none_or(|b| info.rssi > b.info.rssi) {
                    best = Some(SelectedAp { info, credentials });
                }
            }
            if best.is_some() {
                return best;
            }
        }
        None
    }

    fn connect_station(&mut self) -> Result<()> {
        let selected = self
            .state
            .selected_ap
            .as_ref()
            .ok_or(RadioError::ConnectFailed)?;
        let credentials = self
            .config
            .access_points
            .get(selected.credentials)
            .ok_or(RadioError::ConnectFailed)?;
        self.radio.connect(
            &credentials.ssid,
            &credentials.password,
            self.state.channel,
            Some(selected.info.bssid),
        )
    }

    /// Wait for DHCP, then for the station MAC, within the connect timeout
    fn wait_for_station(&mut self) -> Result<Ipv4> {
        let deadline = self.timer.now_ms() + u64::from(self.config.connect_timeout_ms);
        let ip = loop {
            if let Some(ip) = self.radio.local_ip() {
                break ip;
            }
            if self.timer.now_ms() >= deadline {
                log_warn!("radio: timed out waiting for station IP");
                return Err(RadioError::Timeout.into());
            }
            self.timer.delay_ms(WAIT_POLL_MS)?;
        };
        self.wait_for_mac(deadline)?;
        Ok(ip)
    }

    fn wait_for_mac(&mut self, deadline: u64) -> Result<()> {
        while self.radio.mac_address(Interface::Station) == [0; 6] {
            if self.timer.now_ms() >= deadline {
                log_warn!("radio: timed out waiting for station MAC");
                return Err(RadioError::Timeout.into());
            }
            self.timer.delay_ms(WAIT_POLL_MS)?;
        }
        Ok(())
    }

    fn require_espnow(&self) -> Result<()> {
        if self.is_online(Personality::EspNow) {
            Ok(())
        } else {
            Err(RadioError::NotOnline.into())
        }
    }

    /// Register an ESP-NOW peer on the current channel
    pub fn esp_now_add_peer(&mut self, peer: &MacAddress) -> Result<()> {
        self.require_espnow()?;
        self.radio.esp_now_add_peer(peer, self.state.channel)
    }

    pub fn esp_now_remove_peer(&mut self, peer: &MacAddress) -> Result<()> {
        self.require_espnow()?;
        self.radio.esp_now_remove_peer(peer)
    }

    /// Send one ESP-NOW frame
    pub fn esp_now_send(&mut self, peer: &MacAddress, data: &[u8]) -> Result<()> {
        self.require_espnow()?;
        self.radio.esp_now_send(peer, data)
    }

    /// Print channel, personality status and active components
    pub fn status_report(&self, mut display: Option<&mut dyn Write>) {
        let started = self.state.started;
        display!(
            display,
            "Channel: {}{}",
            self.state.channel,
            if self.state.use_default_channel { " (default)" } else { "" }
        );
        for p in Personality::ALL {
            let status = if is_online(started, p) {
                "online"
            } else if personality_active(started, p) {
                "partial"
            } else {
                "off"
            };
            display!(display, "{}: {}", p.name(), status);
        }
        for c in started.components() {
            display!(display, "  {}", c.name());
        }
        if let Some(ip) = self.state.station_ip {
            display!(display, "Station IP: {}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]);
        }
        if self.state.reconnect_requested {
            display!(
                display,
                "Reconnect pending, delay {} ms",
                self.backoff.current().as_millis()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockRadio, MockTimer, RadioCall};
    use std::string::String;

    fn station_config(channel: u8) -> RadioConfig {
        let mut config = RadioConfig {
            station_channel: channel,
            ..RadioConfig::default()
        };
        config.add_access_point("home", "secret");
        config
    }

    fn radio_with_home(channel: u8) -> MockRadio {
        let mut radio = MockRadio::new();
        radio.add_network("other", 3, -30);
        radio.add_network("home", channel, -55);
        radio
    }

    #[test]
    fn test_station_fixed_channel() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(radio_with_home(6), MockTimer::new(), station_config(6), &events);
        c.enable(false, false, true, None).unwrap();

        assert_eq!(c.channel(), 6);
        assert!(!c.is_using_default_channel());
        assert_eq!(c.started(), Components::STATION);
        assert_eq!(c.started().components().count(), 9);
        assert!(!personality_active(c.started(), Personality::EspNow));
        assert!(!personality_active(c.started(), Personality::SoftAp));
        assert_eq!(c.station_ip(), Some([192, 168, 1, 50]));
        assert_eq!(c.radio().connected_ssid(), Some("home"));
        assert!(!c.radio().auto_reconnect());
        assert_eq!(c.radio().station_protocols(), Protocols::BGN);
    }

    #[test]
    fn test_station_channel_from_scan() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(radio_with_home(11), MockTimer::new(), station_config(0), &events);
        c.enable(false, false, true, None).unwrap();
        assert_eq!(c.channel(), 11);
        assert!(!c.is_using_default_channel());
        assert_eq!(c.radio().channel().unwrap(), 11);
    }

    #[test]
    fn test_fixed_channel_requires_ap_on_that_channel() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(radio_with_home(11), MockTimer::new(), station_config(6), &events);
        let err = c.enable(false, false, true, None).unwrap_err();
        match err {
            StopStartError::NotStarted(missing) => {
                assert!(missing.contains(Components::STATION_AP_SELECT | Components::STATION_ONLINE));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(c.radio().count_of(RadioCall::Connect), 0);
        assert!(c.reconnect_pending());
        assert_eq!(c.channel(), 0);
    }

    #[test]
    fn test_same_enable_twice_is_free() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(radio_with_home(6), MockTimer::new(), station_config(0), &events);
        c.enable(true, true, true, None).unwrap();
        let calls = c.radio().call_count();
        let delays = c.timer().delay_count();

        c.enable(true, true, true, None).unwrap();
        assert_eq!(c.radio().call_count(), calls);
        assert_eq!(c.timer().delay_count(), delays);
    }

    #[test]
    fn test_mode_set_once_for_station_and_espnow() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(radio_with_home(6), MockTimer::new(), station_config(0), &events);
        c.enable(true, false, true, None).unwrap();

        assert_eq!(c.radio().count_of(RadioCall::SetMode(RadioMode::STATION)), 1);
        assert_eq!(
            c.radio().station_protocols(),
            Protocols::BGN | Protocols::LONG_RANGE
        );
        assert!(c.is_online(Personality::EspNow));
        assert!(c.is_online(Personality::Station));
        assert_eq!(c.channel(), 6);
        assert!(c.radio().is_promiscuous());
        assert!(c.radio().has_promiscuous_callback());
        assert!(c.radio().is_esp_now_running());
    }

    #[test]
    fn test_station_start_restarts_soft_ap_on_default_channel() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(radio_with_home(6), MockTimer::new(), station_config(6), &events);
        c.enable(false, true, false, None).unwrap();
        assert_eq!(c.channel(), 1);
        assert!(c.is_using_default_channel());
        c.radio_mut().clear_calls();

        c.enable(false, true, true, None).unwrap();
        assert_eq!(c.channel(), 6);
        assert!(c.is_online(Personality::SoftAp));
        assert!(c.is_online(Personality::Station));
        assert_eq!(c.radio().count_of(RadioCall::ApStop), 1);
        assert_eq!(c.radio().count_of(RadioCall::ApCreate), 1);
        assert!(c.timer().delay_count() > 0);
    }

    #[test]
    fn test_soft_ap_alone_uses_configured_channel() {
        let events = RadioEvents::new();
        let config = RadioConfig {
            soft_ap_channel: 9,
            ..RadioConfig::default()
        };
        let mut c = RadioCoordinator::new(MockRadio::new(), MockTimer::new(), config, &events);
        c.enable(false, true, false, None).unwrap();
        assert_eq!(c.channel(), 9);
        assert_eq!(c.started(), Components::SOFT_AP);
        assert!(c.radio().is_ap_running());
        assert!(c.radio().is_dns_running());
        assert_eq!(c.radio().mode(), RadioMode::SOFT_AP);
        assert_eq!(c.radio().ap_protocols(), Protocols::BGN);
        assert_eq!(c.radio().hostname(), Some("esp-robot"));
    }

    #[test]
    fn test_disable_all_resets_channel() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(radio_with_home(6), MockTimer::new(), station_config(0), &events);
        c.enable(true, true, true, None).unwrap();
        c.enable(false, false, false, None).unwrap();
        assert!(c.started().is_empty());
        assert_eq!(c.channel(), 0);
        assert!(c.is_using_default_channel());
        assert_eq!(c.radio().mode(), RadioMode::empty());
        assert!(!c.radio().is_connected());
        assert!(!c.radio().is_esp_now_running());
        assert!(!c.radio().has_promiscuous_callback());
        assert!(!c.radio().is_dns_running());
    }

    #[test]
    fn test_station_mode_kept_while_espnow_needs_it() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(radio_with_home(6), MockTimer::new(), station_config(0), &events);
        c.enable(true, false, true, None).unwrap();
        c.radio_mut().clear_calls();

        c.enable(true, false, false, None).unwrap();
        assert!(c.is_online(Personality::EspNow));
        assert!(!personality_active(c.started(), Personality::Station));
        assert_eq!(c.radio().count_of(RadioCall::Disconnect), 1);
        assert!(c
            .radio()
            .calls()
            .iter()
            .all(|call| !matches!(call, RadioCall::SetMode(_))));
        assert_eq!(c.radio().mode(), RadioMode::STATION);
        assert_eq!(
            c.radio().station_protocols(),
            Protocols::BGN | Protocols::LONG_RANGE
        );
    }

    #[test]
    fn test_long_range_dropped_when_espnow_stops() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(radio_with_home(6), MockTimer::new(), station_config(0), &events);
        c.enable(true, false, true, None).unwrap();
        c.radio_mut().clear_calls();

        c.enable(false, false, true, None).unwrap();
        assert!(c.is_online(Personality::Station));
        assert!(!personality_active(c.started(), Personality::EspNow));
        assert_eq!(c.radio().station_protocols(), Protocols::BGN);
        assert_eq!(
            c.radio()
                .count_of(RadioCall::SetProtocol(Interface::Station, Protocols::BGN)),
            1
        );
        assert_eq!(c.radio().count_of(RadioCall::Disconnect), 0);
        assert_eq!(c.channel(), 6);
    }

    #[test]
    fn test_scan_failure_prunes_station_only() {
        let events = RadioEvents::new();
        let mut radio = radio_with_home(6);
        radio.set_scan_error(Some(-3));
        let config = RadioConfig {
            espnow_channel: 4,
            ..station_config(0)
        };
        let mut c = RadioCoordinator::new(radio, MockTimer::new(), config, &events);
        let mut out = String::new();
        let err = c.enable(true, false, true, Some(&mut out)).unwrap_err();

        assert!(c.is_online(Personality::EspNow));
        assert!(!c.is_online(Personality::Station));
        assert_eq!(c.channel(), 4);
        assert!(err.components().contains(Components::STATION_SCAN));
        assert!(!err.components().intersects(Components::ESPNOW));
        assert!(out.contains("WiFi scan failed"));
    }

    #[test]
    fn test_failed_step_aborts_without_rollback() {
        let events = RadioEvents::new();
        let mut radio = MockRadio::new();
        radio.inject_failure(RadioCall::ApConfig);
        let mut c = RadioCoordinator::new(radio, MockTimer::new(), RadioConfig::default(), &events);
        let err = c.enable(false, true, false, None).unwrap_err();

        assert!(c.started().contains(Components::SOFT_AP_SSID_PASSWORD));
        assert!(!c.started().contains(Components::SOFT_AP_IP_CONFIG));
        assert_eq!(
            err,
            StopStartError::NotStarted(
                Components::SOFT_AP_IP_CONFIG
                    | Components::SOFT_AP_HOSTNAME
                    | Components::SOFT_AP_DNS_SERVER
                    | Components::SOFT_AP_ONLINE
            )
        );
        assert_eq!(c.radio().count_of(RadioCall::DnsStart), 0);
    }

    #[test]
    fn test_teardown_failure_reports_not_stopped() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(MockRadio::new(), MockTimer::new(), RadioConfig::default(), &events);
        c.enable(false, true, false, None).unwrap();
        c.radio_mut().inject_failure(RadioCall::ApStop);

        let err = c.enable(false, false, false, None).unwrap_err();
        match err {
            StopStartError::NotStopped(stuck) => {
                assert!(stuck.contains(Components::SOFT_AP_SSID_PASSWORD | Components::SOFT_AP_MODE));
                assert!(!stuck.contains(Components::SOFT_AP_DNS_SERVER));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_ip_timeout_is_bounded() {
        let events = RadioEvents::new();
        let mut radio = radio_with_home(6);
        radio.set_ip_never(true);
        let mut c = RadioCoordinator::new(radio, MockTimer::new(), station_config(0), &events);
        let err = c.enable(false, false, true, None).unwrap_err();

        assert_eq!(err, StopStartError::NotStarted(Components::STATION_ONLINE));
        assert!(c.timer().now_ms() >= 15_000);
        assert!(c.timer().now_ms() < 16_000);
        assert!(c.reconnect_pending());
    }

    #[test]
    fn test_delayed_ip_and_mac() {
        let events = RadioEvents::new();
        let mut radio = radio_with_home(6);
        radio.set_ip_delay(5);
        let mut c = RadioCoordinator::new(radio, MockTimer::new(), station_config(0), &events);
        c.enable(false, false, true, None).unwrap();
        assert_eq!(c.timer().now_ms(), 5 * WAIT_POLL_MS as u64);
    }

    #[test]
    fn test_espnow_mac_timeout() {
        let events = RadioEvents::new();
        let mut radio = MockRadio::new();
        radio.set_mac_populated(false);
        let mut c = RadioCoordinator::new(radio, MockTimer::new(), RadioConfig::default(), &events);
        let err = c.enable(true, false, false, None).unwrap_err();
        assert_eq!(err, StopStartError::NotStarted(Components::ESPNOW_ONLINE));
        assert!(c.radio().is_esp_now_running());
        // nothing online, so the channel is released
        assert_eq!(c.channel(), 0);
    }

    #[test]
    fn test_espnow_sets_channel_when_radio_differs() {
        let events = RadioEvents::new();
        let config = RadioConfig {
            espnow_channel: 13,
            ..RadioConfig::default()
        };
        let mut c = RadioCoordinator::new(MockRadio::new(), MockTimer::new(), config, &events);
        c.enable(true, false, false, None).unwrap();
        assert_eq!(c.radio().count_of(RadioCall::SetChannel(13)), 1);
        assert_eq!(c.radio().channel().unwrap(), 13);
        assert_eq!(
            c.radio().count_of(RadioCall::EspNowRegisterCallback(true)),
            0
        );
    }

    #[test]
    fn test_espnow_passthroughs_require_online() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(MockRadio::new(), MockTimer::new(), RadioConfig::default(), &events);
        let peer = [1, 2, 3, 4, 5, 6];
        assert_eq!(
            c.esp_now_send(&peer, b"hi"),
            Err(PlatformError::Radio(RadioError::NotOnline))
        );

        fn on_receive(_from: &MacAddress, _data: &[u8]) {}
        c.set_esp_now_receiver(Some(on_receive));
        c.enable(true, false, false, None).unwrap();
        c.esp_now_add_peer(&peer).unwrap();
        c.esp_now_send(&peer, b"hi").unwrap();
        assert_eq!(c.radio().peers(), &[peer]);
        assert_eq!(c.radio().sent().len(), 1);
        c.esp_now_remove_peer(&peer).unwrap();
        assert!(c.radio().peers().is_empty());
        assert_eq!(
            c.radio().count_of(RadioCall::EspNowRegisterCallback(true)),
            1
        );
    }

    #[test]
    fn test_disconnect_event_reconnects_with_backoff() {
        let events = RadioEvents::new();
        let mut config = station_config(0);
        config.retry_min = Duration::from_millis(500);
        config.retry_max = Duration::from_millis(2000);
        let mut c = RadioCoordinator::new(radio_with_home(6), MockTimer::new(), config, &events);
        c.enable(false, false, true, None).unwrap();

        c.radio_mut().drop_station();
        events.sender().post(RadioEvent::StationDisconnected);
        let t0 = Instant::from_millis(0);
        c.poll(t0, None).unwrap();
        assert!(!c.is_online(Personality::Station));
        assert!(c.reconnect_pending());
        assert_eq!(c.state().next_reconnect, Some(Instant::from_millis(500)));

        // access point gone: the attempt fails and the delay doubles
        c.radio_mut().set_ip_never(true);
        assert!(c.poll(Instant::from_millis(499), None).is_ok());
        assert_eq!(c.radio().count_of(RadioCall::Disconnect), 0);
        assert!(c.poll(Instant::from_millis(500), None).is_err());
        assert_eq!(c.reconnect_delay(), Duration::from_millis(1000));
        assert_eq!(c.state().next_reconnect, Some(Instant::from_millis(1500)));

        // access point back
        c.radio_mut().set_ip_never(false);
        c.poll(Instant::from_millis(1500), None).unwrap();
        assert!(c.is_online(Personality::Station));
        assert!(!c.reconnect_pending());
        assert_eq!(c.reconnect_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_disable_station_cancels_reconnect() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(radio_with_home(6), MockTimer::new(), station_config(0), &events);
        c.enable(false, false, true, None).unwrap();
        events.sender().post(RadioEvent::StationDisconnected);
        c.poll(Instant::from_millis(0), None).unwrap();
        assert!(c.reconnect_pending());

        c.enable(false, false, false, None).unwrap();
        assert!(!c.reconnect_pending());
        assert!(c.started().is_empty());
    }

    #[test]
    fn test_apply_config_resets_backoff() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(radio_with_home(6), MockTimer::new(), station_config(0), &events);
        c.backoff.advance();
        assert_eq!(c.reconnect_delay(), Duration::from_secs(2));
        c.apply_config(station_config(6));
        assert_eq!(c.reconnect_delay(), Duration::from_secs(1));
        assert_eq!(c.config().station_channel, 6);
    }

    #[test]
    fn test_events_update_status() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(MockRadio::new(), MockTimer::new(), RadioConfig::default(), &events);
        c.enable(false, true, false, None).unwrap();
        let sender = events.sender();
        sender.post(RadioEvent::StationGotIp([10, 1, 2, 3]));
        sender.post(RadioEvent::SoftApStopped);
        sender.post(RadioEvent::EspNowSendComplete {
            peer: [0; 6],
            success: false,
        });
        c.poll(Instant::from_millis(0), None).unwrap();
        assert!(events.is_empty());
        assert_eq!(c.station_ip(), Some([10, 1, 2, 3]));
        assert!(!c.is_online(Personality::SoftAp));
        assert!(personality_active(c.started(), Personality::SoftAp));
    }

    #[test]
    fn test_status_report() {
        let events = RadioEvents::new();
        let mut c =
            RadioCoordinator::new(radio_with_home(6), MockTimer::new(), station_config(0), &events);
        c.enable(false, false, true, None).unwrap();
        let mut out = String::new();
        c.status_report(Some(&mut out));
        assert!(out.starts_with("Channel: 6\n"));
        assert!(out.contains("Station: online"));
        assert!(out.contains("ESP-NOW: off"));
        assert!(out.contains("  Station connect\n"));
        assert!(out.contains("Station IP: 192.168.1.50"));
        c.status_report(None);
    }

    #[test]
    fn test_promiscuous_callback_records_rssi() {
        promiscuous_rx(&[0u8; 4], -61);
        assert_eq!(last_rssi(), Some(-61));
    }
}
