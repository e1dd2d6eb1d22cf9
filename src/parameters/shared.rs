//! Lock-protected parameter table
//!
//! The table is written by command handlers and read by the radio task.
//! `SharedParameters` runs every store operation under the `SharedState`
//! lock, so a reader never observes a half-loaded table.

use super::error::Result;
use super::store::{clear_parameter, get_parameters, set_parameter, LoadSource};
use super::table::ParameterTable;
use super::wifi::WifiParams;
use crate::core::traits::SharedState;
use crate::platform::FileSystem;
use core::fmt::Write;

/// Parameter table behind a lock, bound to its file
pub struct SharedParameters<S: SharedState<ParameterTable>> {
    state: S,
    path: &'static str,
}

impl<S: SharedState<ParameterTable>> SharedParameters<S> {
    pub fn new(state: S, path: &'static str) -> Self {
        Self {
            state,
            path,
        }
    }

    /// File backing this table
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Load (and heal) the table from its file
    pub fn load<F: FileSystem>(
        &self,
        fs: &mut F,
        display: Option<&mut dyn Write>,
    ) -> Result<LoadSource> {
        let path = self.path;
        self.state
            .with_mut(|table| get_parameters(fs, path, table, display))
    }

    /// Set one parameter from its text form and persist the table
    pub fn set<F: FileSystem>(
        &self,
        fs: &mut F,
        name: &str,
        text: &[u8],
        display: Option<&mut dyn Write>,
    ) -> Result<()> {
        let path = self.path;
        self.state
            .with_mut(|table| set_parameter(fs, path, table, name, text, display))
    }

    /// Zero one parameter and persist the table
    pub fn clear<F: FileSystem>(
        &self,
        fs: &mut F,
        name: &str,
        display: Option<&mut dyn Write>,
    ) -> Result<()> {
        let path = self.path;
        self.state
            .with_mut(|table| clear_parameter(fs, path, table, name, display))
    }

    /// Read access to the live table
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ParameterTable) -> R,
    {
        self.state.with(f)
    }

    /// WiFi settings from the live table
    pub fn wifi_params(&self) -> WifiParams {
        self.state.with(WifiParams::from_table)
    }
}
