//! Radio components and personalities
//!
//! Each personality is brought up as a fixed sequence of components. A
//! component is marked active right after its platform call succeeds and
//! cleared right after its teardown call.
//!
//! ```text
//! ESP-NOW   mode → protocol → channel-select → channel-set → promiscuous-callback
//!           → promiscuous-mode → layer → online
//! Soft-AP   mode → protocol → channel-select → ssid/password → ip-config
//!           → hostname → dns-server → online
//! Station   mode → protocol → scan → channel-select → ap-select → hostname
//!           → auto-reconnect-disable → connect → online
//! ```

use bitflags::bitflags;

/// One tracked step of bringing a personality online
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "esp32", derive(defmt::Format))]
#[repr(u8)]
pub enum Component {
    EspNowMode = 0,
    EspNowProtocol,
    EspNowChannelSelect,
    EspNowChannelSet,
    EspNowPromiscuousCallback,
    EspNowPromiscuousMode,
    EspNowLayer,
    EspNowOnline,
    SoftApMode = 8,
    SoftApProtocol,
    SoftApChannelSelect,
    SoftApSsidPassword,
    SoftApIpConfig,
    SoftApHostname,
    SoftApDnsServer,
    SoftApOnline,
    StationMode = 16,
    StationProtocol,
    StationScan,
    StationChannelSelect,
    StationApSelect,
    StationHostname,
    StationAutoReconnect,
    StationConnect,
    StationOnline,
}

impl Component {
    /// Every component, in bit order
    pub const ALL: [Component; 25] = [
        Component::EspNowMode,
        Component::EspNowProtocol,
        Component::EspNowChannelSelect,
        Component::EspNowChannelSet,
        Component::EspNowPromiscuousCallback,
        Component::EspNowPromiscuousMode,
        Component::EspNowLayer,
        Component::EspNowOnline,
        Component::SoftApMode,
        Component::SoftApProtocol,
        Component::SoftApChannelSelect,
        Component::SoftApSsidPassword,
        Component::SoftApIpConfig,
        Component::SoftApHostname,
        Component::SoftApDnsServer,
        Component::SoftApOnline,
        Component::StationMode,
        Component::StationProtocol,
        Component::StationScan,
        Component::StationChannelSelect,
        Component::StationApSelect,
        Component::StationHostname,
        Component::StationAutoReconnect,
        Component::StationConnect,
        Component::StationOnline,
    ];

    /// Single-bit set for this component
    pub const fn bit(self) -> Components {
        Components::from_bits_retain(1 << self as u32)
    }

    /// Personality this component belongs to
    pub const fn personality(self) -> Personality {
        match self as u8 {
            0..=7 => Personality::EspNow,
            8..=15 => Personality::SoftAp,
            _ => Personality::Station,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Component::EspNowMode => "ESP-NOW mode",
            Component::EspNowProtocol => "ESP-NOW protocol",
            Component::EspNowChannelSelect => "ESP-NOW channel select",
            Component::EspNowChannelSet => "ESP-NOW channel set",
            Component::EspNowPromiscuousCallback => "ESP-NOW promiscuous callback",
            Component::EspNowPromiscuousMode => "ESP-NOW promiscuous mode",
            Component::EspNowLayer => "ESP-NOW layer",
            Component::EspNowOnline => "ESP-NOW online",
            Component::SoftApMode => "Soft-AP mode",
            Component::SoftApProtocol => "Soft-AP protocol",
            Component::SoftApChannelSelect => "Soft-AP channel select",
            Component::SoftApSsidPassword => "Soft-AP SSID/password",
            Component::SoftApIpConfig => "Soft-AP IP config",
            Component::SoftApHostname => "Soft-AP hostname",
            Component::SoftApDnsServer => "Soft-AP DNS server",
            Component::SoftApOnline => "Soft-AP online",
            Component::StationMode => "Station mode",
            Component::StationProtocol => "Station protocol",
            Component::StationScan => "Station scan",
            Component::StationChannelSelect => "Station channel select",
            Component::StationApSelect => "Station AP select",
            Component::StationHostname => "Station hostname",
            Component::StationAutoReconnect => "Station auto-reconnect off",
            Component::StationConnect => "Station connect",
            Component::StationOnline => "Station online",
        }
    }
}

bitflags! {
    /// Set of components
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Components: u32 {
        const ESPNOW_MODE = 1 << 0;
        const ESPNOW_PROTOCOL = 1 << 1;
        const ESPNOW_CHANNEL_SELECT = 1 << 2;
        const ESPNOW_CHANNEL_SET = 1 << 3;
        const ESPNOW_PROMISCUOUS_CALLBACK = 1 << 4;
        const ESPNOW_PROMISCUOUS_MODE = 1 << 5;
        const ESPNOW_LAYER = 1 << 6;
        const ESPNOW_ONLINE = 1 << 7;

        const SOFT_AP_MODE = 1 << 8;
        const SOFT_AP_PROTOCOL = 1 << 9;
        const SOFT_AP_CHANNEL_SELECT = 1 << 10;
        const SOFT_AP_SSID_PASSWORD = 1 << 11;
        const SOFT_AP_IP_CONFIG = 1 << 12;
        const SOFT_AP_HOSTNAME = 1 << 13;
        const SOFT_AP_DNS_SERVER = 1 << 14;
        const SOFT_AP_ONLINE = 1 << 15;

        const STATION_MODE = 1 << 16;
        const STATION_PROTOCOL = 1 << 17;
        const STATION_SCAN = 1 << 18;
        const STATION_CHANNEL_SELECT = 1 << 19;
        const STATION_AP_SELECT = 1 << 20;
        const STATION_HOSTNAME = 1 << 21;
        const STATION_AUTO_RECONNECT = 1 << 22;
        const STATION_CONNECT = 1 << 23;
        const STATION_ONLINE = 1 << 24;

        const ESPNOW = 0x0000_00ff;
        const SOFT_AP = 0x0000_ff00;
        const STATION = 0x01ff_0000;

        const ONLINE = Self::ESPNOW_ONLINE.bits()
            | Self::SOFT_AP_ONLINE.bits()
            | Self::STATION_ONLINE.bits();

        /// Components that need the station interface in the mode register
        const STATION_INTERFACE = Self::ESPNOW_MODE.bits() | Self::STATION_MODE.bits();
        const MODE = Self::STATION_INTERFACE.bits() | Self::SOFT_AP_MODE.bits();
        const PROTOCOL = Self::ESPNOW_PROTOCOL.bits()
            | Self::SOFT_AP_PROTOCOL.bits()
            | Self::STATION_PROTOCOL.bits();
    }
}

impl Components {
    /// Individual components in the set, in bit order
    pub fn components(self) -> impl Iterator<Item = Component> {
        Component::ALL
            .into_iter()
            .filter(move |c| self.contains(c.bit()))
    }
}

impl From<Component> for Components {
    fn from(component: Component) -> Self {
        component.bit()
    }
}

/// One of the three radio users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "esp32", derive(defmt::Format))]
pub enum Personality {
    EspNow,
    SoftAp,
    Station,
}

impl Personality {
    /// Every personality, in bring-up priority order
    pub const ALL: [Personality; 3] = [
        Personality::EspNow,
        Personality::SoftAp,
        Personality::Station,
    ];

    /// Full component set of this personality
    pub const fn components(self) -> Components {
        match self {
            Personality::EspNow => Components::ESPNOW,
            Personality::SoftAp => Components::SOFT_AP,
            Personality::Station => Components::STATION,
        }
    }

    /// The online component of this personality
    pub const fn online(self) -> Components {
        match self {
            Personality::EspNow => Components::ESPNOW_ONLINE,
            Personality::SoftAp => Components::SOFT_AP_ONLINE,
            Personality::Station => Components::STATION_ONLINE,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Personality::EspNow => "ESP-NOW",
            Personality::SoftAp => "Soft-AP",
            Personality::Station => "Station",
        }
    }
}

/// Whether `personality` is online in `set`
pub fn is_online(set: Components, personality: Personality) -> bool {
    set.contains(personality.online())
}

/// Whether any component of `personality` is in `set`
pub fn personality_active(set: Components, personality: Personality) -> bool {
    set.intersects(personality.components())
}
