//! Scoped suppression of the engine's error reporting.

use crate::engine::{Engine, ReportingToken};

/// Keeps engine error reporting suppressed while alive.
///
/// Reporting is restored to its previous state when the guard drops,
/// whichever way the enclosing scope is left.
pub struct SilenceReports<'a> {
    engine: &'a dyn Engine,
    token: Option<ReportingToken>,
}

impl<'a> SilenceReports<'a> {
    /// Suppress reporting on `engine` until the guard drops.
    pub fn new(engine: &'a dyn Engine) -> Self {
        let token = engine.suppress_error_reporting();
        Self {
            engine,
            token: Some(token),
        }
    }
}

impl Drop for SilenceReports<'_> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.engine.restore_error_reporting(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEngine;

    #[test]
    fn test_guard_restores_on_drop() {
        let engine = MemoryEngine::new();
        assert!(engine.reporting_enabled());
        {
            let _guard = SilenceReports::new(&engine);
            assert!(!engine.reporting_enabled());
        }
        assert!(engine.reporting_enabled());
    }

    #[test]
    fn test_nested_guards_restore_outer_state() {
        let engine = MemoryEngine::new();
        {
            let _outer = SilenceReports::new(&engine);
            {
                let _inner = SilenceReports::new(&engine);
            }
            assert!(!engine.reporting_enabled());
        }
        assert!(engine.reporting_enabled());
    }

    #[test]
    fn test_guard_restores_on_early_return() {
        fn probe(engine: &MemoryEngine) -> Result<(), &'static str> {
            let _guard = SilenceReports::new(engine);
            Err("probe failed")
        }

        let engine = MemoryEngine::new();
        assert!(probe(&engine).is_err());
        assert!(engine.reporting_enabled());
    }
}
