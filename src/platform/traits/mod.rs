//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod filesystem;
pub mod radio;
pub mod timer;

// Re-export trait interfaces
pub use filesystem::{File, FileSystem, OpenMode};
pub use radio::{
    AccessPointInfo, EspNowRecvCallback, Interface, Ipv4, MacAddress, PromiscuousCallback,
    Protocols, RadioInterface, RadioMode, SoftApIpConfig,
};
pub use timer::TimerInterface;
