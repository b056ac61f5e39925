//! Time-stamped, colour-coded log macros.
//!
//! All output goes to stderr so the frame stream on stdout stays clean when the
//! JSON presenter is selected.

/// Environment variable enabling the high-frequency [`event!`] log.
pub const EVENT_LOG_VAR: &str = "LOG_LANDER_EVENTS";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        eprintln!("\x1b[32m[INFO] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        eprintln!("\x1b[35m[WARN] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        eprintln!("\x1b[31m[ERROR][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! demo {
    ($($arg:tt)*) => {
        eprintln!("\x1b[1;36m[DEMO] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! event {
    ($($arg:tt)*) => {
        if std::env::var($crate::logger::EVENT_LOG_VAR).is_ok() {
            eprintln!("\x1b[36m[EVENT][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
        }
    };
}
