//! Coordinator state
//!
//! In-memory only; starts empty at boot.

use super::component::{Components, Personality};
use crate::platform::traits::{AccessPointInfo, Ipv4};
use embassy_time::Instant;

/// Access point chosen by the station scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAp {
    /// Scan entry that matched
    pub info: AccessPointInfo,
    /// Index into `RadioConfig::access_points`
    pub credentials: usize,
}

/// Everything the coordinator tracks between calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioCoordinatorState {
    /// Active components
    pub started: Components,
    /// Channel in use, 0 when unset
    pub channel: u8,
    /// `channel` is the implicit fallback rather than an explicit choice
    pub use_default_channel: bool,
    pub selected_ap: Option<SelectedAp>,
    pub station_ip: Option<Ipv4>,
    /// Personalities requested by the last `enable`
    pub wanted: Components,
    /// Station dropped or failed to come online; `poll` retries it
    pub reconnect_requested: bool,
    /// When the next reconnect attempt is due
    pub next_reconnect: Option<Instant>,
}

impl RadioCoordinatorState {
    pub const fn new() -> Self {
        Self {
            started: Components::empty(),
            channel: 0,
            use_default_channel: true,
            selected_ap: None,
            station_ip: None,
            wanted: Components::empty(),
            reconnect_requested: false,
            next_reconnect: None,
        }
    }

    /// Whether any personality is online
    pub fn any_online(&self) -> bool {
        self.started.intersects(Components::ONLINE)
    }

    /// Whether `personality` was requested by the last `enable`
    pub fn wants(&self, personality: Personality) -> bool {
        self.wanted.contains(personality.online())
    }

    /// Forget any pending reconnect
    pub fn cancel_reconnect(&mut self) {
        self.reconnect_requested = false;
        self.next_reconnect = None;
    }
}

impl Default for RadioCoordinatorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_empty() {
        let state = RadioCoordinatorState::new();
        assert!(state.started.is_empty());
        assert_eq!(state.channel, 0);
        assert!(state.use_default_channel);
        assert!(!state.any_online());
    }

    #[test]
    fn test_wants() {
        let mut state = RadioCoordinatorState::new();
        state.wanted = Components::STATION;
        assert!(state.wants(Personality::Station));
        assert!(!state.wants(Personality::EspNow));
    }
}
