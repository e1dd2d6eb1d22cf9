//! Logging abstraction
//!
//! Provides unified logging macros that work across different targets:
//! - Embedded (esp32): Uses defmt
//! - Host tests: Uses println!
//! - Host non-test: No-op
//!
//! Arguments must be printable by both back ends, so callers log primitives,
//! `&str` and types deriving `defmt::Format`. Bitflag sets are logged through
//! their `bits()`.

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "esp32")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "esp32"), test))]
        println!("[INFO] {}", format!($($arg)*));
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "esp32")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "esp32"), test))]
        println!("[WARN] {}", format!($($arg)*));
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "esp32")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(feature = "esp32"), test))]
        eprintln!("[ERROR] {}", format!($($arg)*));
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "esp32")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "esp32"), test))]
        println!("[DEBUG] {}", format!($($arg)*));
    }};
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "esp32")]
        ::defmt::trace!($($arg)*);

        #[cfg(all(not(feature = "esp32"), test))]
        println!("[TRACE] {}", format!($($arg)*));
    }};
}
