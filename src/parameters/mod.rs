//! Parameter Storage System
//!
//! Statically described parameters with live values, persisted as a flat
//! file on the target filesystem and loaded at boot.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │  Command handlers / boot sequence      │
//! │  (get_parameters, set, clear)          │
//! └──────────────┬─────────────────────────┘
//!                │
//!                ▼
//! ┌────────────────────────────────────────┐
//! │        ParameterTable                  │
//! │  - &'static [ParamDescriptor]          │
//! │  - one ParamValue cell per descriptor  │
//! │  - typed access                        │
//! └──────────────┬─────────────────────────┘
//!                │  format::read_file / write_file
//!                ▼
//! ┌────────────────────────────────────────┐
//! │         FileSystem trait               │
//! └────────────────────────────────────────┘
//! ```
//!
//! # File Format
//!
//! A sequence of records, each three NUL-terminated fields:
//!
//! ```text
//! NET_STA_CHAN\0 6\0 0x000000000000000b\0
//! NET_SSID\0 12\0 home\0
//! NET_SSID2\0 0\0 nullptr\0
//! ```
//!
//! See `format` for the field encoding.
//!
//! # Recovery
//!
//! A missing or unreadable file is rewritten from the defaults and read back,
//! so the next boot starts from a clean file.

pub mod descriptor;
pub mod error;
pub mod format;
pub mod shared;
pub mod store;
pub mod table;
pub mod value;
pub mod wifi;

pub use descriptor::{DefaultValue, ParamDescriptor, ParamType};
pub use error::{ParameterError, Result};
pub use format::{read_file, write_file};
pub use shared::SharedParameters;
pub use store::{clear_parameter, get_parameters, set_parameter, LoadSource};
pub use table::{lookup, parse_value, ParameterTable};
pub use value::{ParamString, ParamValue};
pub use wifi::WifiParams;
