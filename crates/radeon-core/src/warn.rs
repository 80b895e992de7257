//! # Warn Once
//!
//! Programming-error diagnostics (unknown enums, sizing-table bugs) are
//! reported once per callsite so a bad value hit every frame does not flood
//! the log.

/// Log a warning the first time this callsite is reached.
///
/// Evaluates to `true` when the message was emitted.
#[macro_export]
macro_rules! warn_once {
    ($($arg:tt)+) => {{
        static WARNED: ::core::sync::atomic::AtomicBool =
            ::core::sync::atomic::AtomicBool::new(false);
        if !WARNED.swap(true, ::core::sync::atomic::Ordering::Relaxed) {
            $crate::__log::warn!($($arg)+);
            true
        } else {
            false
        }
    }};
}

#[cfg(test)]
mod tests {
    fn report(value: u32) -> bool {
        crate::warn_once!("unexpected value {}", value)
    }

    #[test]
    fn test_warns_once_per_callsite() {
        assert!(report(1));
        assert!(!report(2));
        assert!(!report(3));
    }
}
