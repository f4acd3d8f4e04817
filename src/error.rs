//! Engine error taxonomy.
//!
//! Two severities cover the fatal path of the engine:
//! - [`EngineError::Recoverable`] is raised for media or dynamic logic
//!   problems. The main loop logs it and keeps running, so a bad asset or a
//!   misbehaving subsystem drops the engine back to the frame loop instead
//!   of killing the process.
//! - [`EngineError::Fatal`] is raised for static internal problems or cases
//!   where engine state may be corrupted. The main loop shuts everything
//!   down and exits with a failure status.
//!
//! Errors are plain values propagated with `?`; nothing unwinds. Raise them
//! through [`Common::error`](crate::engine::Common::error) and
//! [`Common::fatal_error`](crate::engine::Common::fatal_error) so the
//! console output and the recursion guard stay consistent.

use std::fmt;

/// Error raised through the engine's fatal path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Aborts the current frame and drops back to the main loop.
    Recoverable(String),
    /// Quits the engine entirely.
    Fatal(String),
}

impl EngineError {
    /// The message the error was raised with.
    pub fn message(&self) -> &str {
        match self {
            EngineError::Recoverable(msg) | EngineError::Fatal(msg) => msg,
        }
    }

    /// True for [`EngineError::Fatal`].
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Fatal(_))
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Recoverable(msg) => write!(f, "error: {}", msg),
            EngineError::Fatal(msg) => write!(f, "fatal error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_queries() {
        let soft = EngineError::Recoverable("missing texture".to_string());
        let hard = EngineError::Fatal("heap corruption".to_string());
        assert!(!soft.is_fatal());
        assert!(hard.is_fatal());
        assert_eq!(soft.message(), "missing texture");
        assert_eq!(hard.message(), "heap corruption");
    }

    #[test]
    fn test_display_prefixes_severity() {
        let soft = EngineError::Recoverable("bad model".to_string());
        let hard = EngineError::Fatal("bad vtable".to_string());
        assert_eq!(soft.to_string(), "error: bad model");
        assert_eq!(hard.to_string(), "fatal error: bad vtable");
    }
}
