//! Per-request inspection settings and cooperative cancellation

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::{InspectionError, InspectionResult};

pub const DEFAULT_LOCALE: &str = "en-US";

/// Nesting limit for recursive inspections; deeper trees fail the request
/// instead of exhausting the stack.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Environment variable overriding the locale of every request.
pub const LOCALE_ENV_VAR: &str = "PQ_LOCALE";

/// A cancellation handle polled by long-running inspections.
pub trait Cancellation: Send + Sync + fmt::Debug {
    fn is_cancelled(&self) -> bool;
}

/// Shared flag that any clone can trip.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl Cancellation for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Settings carried by every inspection request.
#[derive(Debug, Clone)]
pub struct InspectionSettings {
    pub locale: String,
    pub cancellation: Option<Arc<dyn Cancellation>>,
    pub max_depth: usize,
}

impl Default for InspectionSettings {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            cancellation: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl InspectionSettings {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            cancellation: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cancellation(mut self, cancellation: Arc<dyn Cancellation>) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Create settings from environment or initialization options
    ///
    /// Checks in order:
    /// 1. Environment variable PQ_LOCALE
    /// 2. Explicit initialization parameter
    /// 3. Falls back to `en-US`
    pub fn from_env_or_default(init_option: Option<&str>) -> Self {
        if let Some(locale) = std::env::var(LOCALE_ENV_VAR)
            .ok()
            .and_then(|value| Self::parse_locale(&value))
        {
            debug!("Using locale {} from {}", locale, LOCALE_ENV_VAR);
            return Self::new(locale);
        }

        if let Some(locale) = init_option.and_then(Self::parse_locale) {
            return Self::new(locale);
        }

        Self::default()
    }

    fn parse_locale(value: &str) -> Option<String> {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|cancellation| cancellation.is_cancelled())
    }

    /// Fails with [`InspectionError::Cancelled`] once the handle is tripped.
    pub fn check_cancelled(&self) -> InspectionResult<()> {
        if self.is_cancelled() {
            debug!("Inspection cancelled");
            return Err(InspectionError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = InspectionSettings::default();
        assert_eq!(settings.locale, DEFAULT_LOCALE);
        assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
        assert!(settings.check_cancelled().is_ok());
    }

    #[test]
    fn test_cancellation_is_shared_between_clones() {
        let token = CancellationToken::new();
        let settings = InspectionSettings::default().with_cancellation(Arc::new(token.clone()));
        assert!(!settings.is_cancelled());
        token.cancel();
        assert_eq!(settings.check_cancelled(), Err(InspectionError::Cancelled));
    }

    #[test]
    fn test_parse_locale_ignores_blank_values() {
        assert_eq!(InspectionSettings::parse_locale("  "), None);
        assert_eq!(
            InspectionSettings::parse_locale(" de-DE "),
            Some("de-DE".to_string())
        );
    }
}
