//! Radio coordinator error types

use super::component::Components;
use core::fmt;

/// Failure of a stop/start sequence
///
/// Carries the components left in an unexpected state. Nothing is rolled
/// back; the coordinator state reflects exactly what the radio did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopStartError {
    /// Teardown aborted; these components are still active
    NotStopped(Components),
    /// Bring-up incomplete; these requested components are not active
    NotStarted(Components),
}

impl StopStartError {
    /// Components left in an unexpected state
    pub fn components(&self) -> Components {
        match self {
            StopStartError::NotStopped(c) | StopStartError::NotStarted(c) => *c,
        }
    }
}

impl fmt::Display for StopStartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (what, components) = match self {
            StopStartError::NotStopped(c) => ("not stopped", *c),
            StopStartError::NotStarted(c) => ("not started", *c),
        };
        write!(f, "{}:", what)?;
        for c in components.components() {
            write!(f, " [{}]", c.name())?;
        }
        Ok(())
    }
}

#[cfg(feature = "esp32")]
impl defmt::Format for StopStartError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            StopStartError::NotStopped(c) => defmt::write!(f, "NotStopped({=u32:#x})", c.bits()),
            StopStartError::NotStarted(c) => defmt::write!(f, "NotStarted({=u32:#x})", c.bits()),
        }
    }
}
