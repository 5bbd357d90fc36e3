//! Logging sink used by the breaker

use tracing::{debug, error, info, warn};

/// Logging sink for breaker events
///
/// The breaker reports closes at `info`, recorded failures and openings at
/// `warn`, probe admissions and rejections at `debug`, and state store
/// failures at `error`.
pub trait Logger: Send + Sync {
    /// Log a debug message
    fn debug(&self, message: &str);

    /// Log an informational message
    fn info(&self, message: &str);

    /// Log a warning
    fn warn(&self, message: &str);

    /// Log an error
    fn error(&self, message: &str);
}

/// Default logger forwarding to `tracing`
///
/// Events carry the breaker's namespace as a field when one is set.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    namespace: Option<String>,
}

impl TracingLogger {
    /// Logger without a namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Logger tagging every event with `namespace`
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
        }
    }

    fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or("-")
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        debug!(target: "switchgear", namespace = self.namespace(), "{message}");
    }

    fn info(&self, message: &str) {
        info!(target: "switchgear", namespace = self.namespace(), "{message}");
    }

    fn warn(&self, message: &str) {
        warn!(target: "switchgear", namespace = self.namespace(), "{message}");
    }

    fn error(&self, message: &str) {
        error!(target: "switchgear", namespace = self.namespace(), "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_field() {
        assert_eq!(TracingLogger::new().namespace(), "-");
        assert_eq!(TracingLogger::with_namespace("tweets").namespace(), "tweets");
    }

    #[test]
    fn test_usable_as_trait_object() {
        let logger: Box<dyn Logger> = Box::new(TracingLogger::with_namespace("tweets"));
        logger.debug("debug");
        logger.info("info");
        logger.warn("warn");
        logger.error("error");
    }
}
