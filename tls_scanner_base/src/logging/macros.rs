//! Structured logging macros accepting `"key" => value` context pairs
//!
//! Context values only need to implement `Display`.

// ============================================================================
// ERROR LOGGING MACROS
// ============================================================================

/// Log error with a [`Code`](crate::logging::Code) and optional context
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log_with_context(
            $crate::logging::Level::Error,
            Some($code),
            $message,
            &[],
        )
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log_with_context(
                $crate::logging::Level::Error,
                Some($code),
                $message,
                &context_strings,
            )
        }
    };
}

// ============================================================================
// WARNING LOGGING MACROS
// ============================================================================

/// Log warning with a code and optional context
#[macro_export]
macro_rules! log_warning {
    ($code:expr, $message:expr) => {
        $crate::logging::log_with_context(
            $crate::logging::Level::Warn,
            Some($code),
            $message,
            &[],
        )
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log_with_context(
                $crate::logging::Level::Warn,
                Some($code),
                $message,
                &context_strings,
            )
        }
    };
}

// ============================================================================
// INFO / DEBUG LOGGING MACROS
// ============================================================================

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::log_with_context($crate::logging::Level::Info, None, $message, &[])
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log_with_context($crate::logging::Level::Info, None, $message, &context_strings)
        }
    };
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        $crate::logging::log_with_context($crate::logging::Level::Debug, None, $message, &[])
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::log_with_context($crate::logging::Level::Debug, None, $message, &context_strings)
        }
    };
}
