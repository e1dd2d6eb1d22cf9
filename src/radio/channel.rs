//! Channel arbitration
//!
//! All three personalities share one radio and therefore one channel. Before
//! every stop/start the coordinator picks the channel the radio will end up
//! on, first match wins:
//!
//! | Rule | Condition                                                | Channel              |
//! |------|----------------------------------------------------------|----------------------|
//! | a    | a personality stays online, channel was chosen explicitly | keep current         |
//! | b    | station starting with a fixed channel                    | station channel      |
//! | c    | station starting, channel follows the scan               | 0 (unset)            |
//! | d    | ESP-NOW is or will be online, channel configured         | ESP-NOW channel      |
//! | e    | soft-AP is or will be online, channel configured         | soft-AP channel      |
//! | f    | otherwise                                                | 1, flagged default   |
//!
//! Personalities that stay online across a channel change are restarted.

use super::component::{is_online, Components, Personality};
use super::config::RadioConfig;

/// Fallback channel when nobody has a preference
pub const DEFAULT_CHANNEL: u8 = 1;

/// Which arbitration rule chose the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "esp32", derive(defmt::Format))]
pub enum ChannelRule {
    KeepCurrent,
    Station,
    Scan,
    EspNow,
    SoftAp,
    Default,
}

/// Outcome of arbitration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPlan {
    pub channel: u8,
    pub use_default: bool,
    pub rule: ChannelRule,
    /// Online personalities that must be stopped and started again
    pub restart: Components,
}

/// Pick the channel for a stop/start of `stopping` and `starting`
pub fn arbitrate(
    active: Components,
    stopping: Components,
    starting: Components,
    current: u8,
    current_is_default: bool,
    config: &RadioConfig,
) -> ChannelPlan {
    let stays_online = |p: Personality| is_online(active, p) && !stopping.intersects(p.online());
    let will_be_online = |p: Personality| stays_online(p) || starting.contains(p.online());
    let any_stays = Personality::ALL.iter().any(|p| stays_online(*p));

    let (channel, rule) = if any_stays && current != 0 && !current_is_default {
        (current, ChannelRule::KeepCurrent)
    } else if starting.contains(Components::STATION_ONLINE) && config.station_channel != 0 {
        (config.station_channel, ChannelRule::Station)
    } else if starting.contains(Components::STATION_ONLINE) {
        (0, ChannelRule::Scan)
    } else {
        preferred_channel(config, will_be_online)
    };

    let mut restart = Components::empty();
    if current != 0 && channel != current {
        for p in Personality::ALL {
            if stays_online(p) {
                restart |= p.components();
            }
        }
    }

    ChannelPlan {
        channel,
        use_default: rule == ChannelRule::Default,
        rule,
        restart,
    }
}

/// Rules d, e and f
pub fn preferred_channel(
    config: &RadioConfig,
    will_be_online: impl Fn(Personality) -> bool,
) -> (u8, ChannelRule) {
    if will_be_online(Personality::EspNow) && config.espnow_channel != 0 {
        (config.espnow_channel, ChannelRule::EspNow)
    } else if will_be_online(Personality::SoftAp) && config.soft_ap_channel != 0 {
        (config.soft_ap_channel, ChannelRule::SoftAp)
    } else {
        (DEFAULT_CHANNEL, ChannelRule::Default)
    }
}
