//! Logging macros
//!
//! Lines are printed through `esp-println` when the `esp32-log` feature is
//! enabled. Without the feature the macros only type-check their arguments.

#[cfg(feature = "esp32-log")]
macro_rules! log_line {
    ($level:literal, $name:expr, $($arg:tt)*) => {
        esp_println::println!("[{}] {}: {}", $level, $name, format_args!($($arg)*))
    };
}

#[cfg(not(feature = "esp32-log"))]
macro_rules! log_line {
    ($level:literal, $name:expr, $($arg:tt)*) => {{
        let _ = &$name;
        let _ = format_args!($($arg)*);
    }};
}

/// Informational line, always emitted when logging is compiled in
macro_rules! log_info {
    ($name:expr, $($arg:tt)*) => {
        $crate::log::log_line!("INFO", $name, $($arg)*)
    };
}

/// Warning line, always emitted when logging is compiled in
macro_rules! log_warn {
    ($name:expr, $($arg:tt)*) => {
        $crate::log::log_line!("WARN", $name, $($arg)*)
    };
}

/// Debug line, emitted only when `$enabled` is true
macro_rules! log_debug {
    ($enabled:expr, $name:expr, $($arg:tt)*) => {
        if $enabled {
            $crate::log::log_line!("DEBUG", $name, $($arg)*)
        }
    };
}

pub(crate) use {log_debug, log_info, log_line, log_warn};
