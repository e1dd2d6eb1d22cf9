#![cfg_attr(not(any(test, feature = "mock")), no_std)]

//! esp_robot - Radio coordination and parameter persistence for ESP32 robots
//!
//! This library provides the platform abstraction, the persisted parameter
//! store and the WiFi radio coordinator that multiplexes ESP-NOW, soft-AP and
//! station on a single radio.

extern crate alloc;

// Platform abstraction layer (filesystem, radio, timer)
pub mod platform;

// Logging, display sink, shared state
pub mod core;

// Persisted parameters
pub mod parameters;

// Radio personalities and channel arbitration
pub mod radio;
