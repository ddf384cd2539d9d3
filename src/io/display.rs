//! Verbosity-gated terminal messages.
//!
//! A single global notification level, shared by the library's extraction
//! helpers and the CLI: 0 = silent, 1 = errors only, 2 = normal progress,
//! 3+ = verbose. Listings requested by the user go to stdout; everything
//! here goes to stderr.

use std::sync::atomic::{AtomicI32, Ordering};

/// Global notification level.
pub static DISPLAY_LEVEL: AtomicI32 = AtomicI32::new(2);

pub fn set_display_level(level: i32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

pub fn display_level() -> i32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Print to stderr when the notification level is at least `$level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::io::display::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_roundtrip() {
        let previous = display_level();
        set_display_level(3);
        assert_eq!(display_level(), 3);
        set_display_level(previous);
    }
}
