//! Optional diagnostic display sink
//!
//! Operations that explain themselves to an operator (parameter loading,
//! radio status) take an `Option<&mut dyn core::fmt::Write>`. `None`
//! suppresses the text; output never changes behavior or return values.
//! This is separate from the `log_*!` macros, which go to the debug probe.

use core::fmt::Write;

/// Reborrow a display sink for a nested call
///
/// `Option::as_deref_mut` keeps the trait object's original lifetime, which
/// pins the outer sink for as long as that lifetime. Going through this
/// function shortens it to the reborrow so the sink can be passed on again.
pub fn reborrow<'b>(display: &'b mut Option<&mut dyn Write>) -> Option<&'b mut dyn Write> {
    match display {
        Some(sink) => Some(&mut **sink),
        None => None,
    }
}

/// Write one diagnostic line to an optional display sink
///
/// Write errors from the sink are ignored.
#[macro_export]
macro_rules! display {
    ($sink:expr, $($arg:tt)*) => {{
        if let Some(sink) = $sink.as_deref_mut() {
            let _ = ::core::fmt::Write::write_fmt(sink, format_args!($($arg)*));
            let _ = ::core::fmt::Write::write_str(sink, "\n");
        }
    }};
}
