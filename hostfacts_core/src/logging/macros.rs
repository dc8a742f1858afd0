//! Logging macros with `"key" => value` context pairs
//!
//! Context values accept any `Display` type.

/// Log error with a Code
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::emit($crate::logging::Level::Error, Some($code), $message, &[])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::emit($crate::logging::Level::Error, Some($code), $message, &context)
        }
    };
}

/// Log warning, optionally with a Code
#[macro_export]
macro_rules! log_warning {
    (code = $code:expr, $message:expr) => {
        $crate::logging::emit($crate::logging::Level::Warn, Some($code), $message, &[])
    };

    (code = $code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::emit($crate::logging::Level::Warn, Some($code), $message, &context)
        }
    };

    ($message:expr) => {
        $crate::logging::emit($crate::logging::Level::Warn, None, $message, &[])
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::emit($crate::logging::Level::Warn, None, $message, &context)
        }
    };
}

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::emit($crate::logging::Level::Info, None, $message, &[])
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            $crate::logging::emit($crate::logging::Level::Info, None, $message, &context)
        }
    };
}

/// Log debug message. Context is only formatted when debug output is enabled.
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        $crate::logging::emit($crate::logging::Level::Debug, None, $message, &[])
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        {
            if $crate::logging::enabled($crate::logging::Level::Debug) {
                let context: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
                $crate::logging::emit($crate::logging::Level::Debug, None, $message, &context)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;

    #[test]
    fn test_macros_expand_without_logger() {
        // No logger is installed in unit tests; every form must still compile and run.
        log_error!(codes::execution::COMPONENT_FAILED, "failed");
        log_error!(codes::execution::COMPONENT_FAILED, "failed", "component" => "x", "attempt" => 1);
        log_warning!("warn");
        log_warning!("warn", "count" => 3);
        log_warning!(code = codes::execution::PASS_CANCELLED, "cancelled");
        log_warning!(code = codes::execution::PASS_CANCELLED, "cancelled", "pending" => 2);
        log_info!("info");
        log_info!("info", "tiers" => 4);
        log_debug!("debug");
        log_debug!("debug", "tier" => 0, "nodes" => "a,b");
    }
}
