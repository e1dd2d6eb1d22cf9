//! WiFi radio coordination
//!
//! One 2.4 GHz radio serves three personalities: an ESP-NOW peer link, a
//! soft access point for configuration, and a station joining a nearby
//! network. They share the mode register, the protocol bits and, above all,
//! the channel. `RadioCoordinator` owns that shared state and sequences every
//! change through component-level bring-up and teardown.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Application (enable / poll / passthroughs)  │
//! └──────────────────────┬───────────────────────┘
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │  RadioCoordinator                            │
//! │   channel::arbitrate → teardown → bring-up   │
//! │   ReconnectBackoff, RadioEvents queue        │
//! └──────────────────────┬───────────────────────┘
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │  RadioInterface + TimerInterface (platform)  │
//! └──────────────────────────────────────────────┘
//! ```

pub mod backoff;
pub mod channel;
pub mod component;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod state;

pub use backoff::ReconnectBackoff;
pub use channel::{arbitrate, ChannelPlan, ChannelRule, DEFAULT_CHANNEL};
pub use component::{is_online, personality_active, Component, Components, Personality};
pub use config::{AccessPointCredentials, RadioConfig, MAX_ACCESS_POINTS};
pub use coordinator::{last_rssi, RadioCoordinator};
pub use error::StopStartError;
pub use events::{EventSender, RadioEvent, RadioEvents, EVENT_QUEUE_SIZE};
pub use state::{RadioCoordinatorState, SelectedAp};
