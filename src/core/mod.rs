//! Core infrastructure
//!
//! Logging macros, the diagnostic display sink and the shared-state
//! abstraction used by the parameter and radio modules.

pub mod display;
pub mod logging;
pub mod traits;
