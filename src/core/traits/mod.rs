//! Core traits shared by the parameter store and the radio coordinator.
//!
//! # Features
//!
//! - **`embassy`**: Enables `EmbassyState<T>`
//! - `MockState<T>` is always available for host testing

pub mod sync;

pub use sync::{MockState, SharedState};

#[cfg(feature = "embassy")]
pub use sync::EmbassyState;
