//! # Scanner logging
//!
//! Thin structured layer over the `log` facade. Every line is rendered as
//! `[CODE] message [key=value, ...]` under the `tls_scanner` target, so the
//! binary decides the sink (env_logger in the CLI) and libraries stay quiet
//! unless a logger is installed.

pub mod codes;
#[macro_use]
pub mod macros;

pub use codes::Code;
pub use log::Level;

/// Log target used for every scanner event
pub const LOG_TARGET: &str = "tls_scanner";

/// Render a message with its code and context pairs
pub fn format_event(code: Option<Code>, message: &str, context: &[(&str, String)]) -> String {
    let mut line = match code {
        Some(code) => format!("[{}] {}", code, message),
        None => message.to_string(),
    };

    if !context.is_empty() {
        let pairs: Vec<String> = context
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        line.push_str(&format!(" [{}]", pairs.join(", ")));
    }

    line
}

/// Emit a structured event through the `log` facade
pub fn log_with_context(
    level: Level,
    code: Option<Code>,
    message: &str,
    context: &[(&str, String)],
) {
    if log::log_enabled!(target: LOG_TARGET, level) {
        log::log!(target: LOG_TARGET, level, "{}", format_event(code, message, context));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_event_without_context() {
        assert_eq!(format_event(None, "scan started", &[]), "scan started");
    }

    #[test]
    fn test_format_event_with_code_and_context() {
        let line = format_event(
            Some(codes::probe::EXECUTION_FAILED),
            "probe failed",
            &[("probe", "CIPHER_SUITE".to_string()), ("round", "2".to_string())],
        );
        assert_eq!(line, "[P001] probe failed [probe=CIPHER_SUITE, round=2]");
    }

    #[test]
    fn test_macros_compile_without_logger() {
        crate::log_info!("no logger installed", "k" => 1);
        crate::log_debug!("debug line");
        crate::log_warning!(codes::report::SHAPE_MISMATCH, "warn", "property" => "X");
        crate::log_error!(codes::scheduler::WORKER_PANIC, "error");
    }
}
