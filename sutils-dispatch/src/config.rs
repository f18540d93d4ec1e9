use serde::Deserialize;

use crate::{ArgsMode, Error};

/// Default number of backoff snooze iterations before the consumer parks.
///
/// Each snooze uses `crossbeam_utils::Backoff::snooze()` which starts with
/// spinning and eventually yields to the OS scheduler.
pub const DEFAULT_SNOOZE_ITERS: usize = 8;

/// Default name given to the consumer thread.
pub const DEFAULT_THREAD_NAME: &str = "sutils-dispatch";

/// Tunables for a [`DispatchQueue`](crate::DispatchQueue).
///
/// Every field has a default, so a partial document is enough:
///
/// ```
/// use sutils_dispatch::{ArgsMode, DispatchConfig};
///
/// let config = DispatchConfig::from_json(r#"{ "mode": "kwargs" }"#).unwrap();
/// assert_eq!(config.mode, ArgsMode::Keyed);
/// assert_eq!(config.snooze_iters, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Backoff iterations before the idle consumer parks. Higher values burn
    /// more CPU but pick up bursty work sooner.
    pub snooze_iters: usize,
    /// Name of the consumer thread.
    pub thread_name: String,
    /// Argument binding used by [`DispatchQueue::bound_with_config`](crate::DispatchQueue::bound_with_config).
    pub mode: ArgsMode,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            snooze_iters: DEFAULT_SNOOZE_ITERS,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            mode: ArgsMode::default(),
        }
    }
}

impl DispatchConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the document is malformed, has unknown fields, or
    /// names an unknown binding mode.
    pub fn from_json(document: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(document)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(DispatchConfig::from_json("{}").unwrap(), DispatchConfig::default());
    }

    #[test]
    fn full_document() {
        let config = DispatchConfig::from_json(
            r#"{ "snooze_iters": 32, "thread_name": "audit-writer", "mode": 1 }"#,
        )
        .unwrap();

        assert_eq!(config.snooze_iters, 32);
        assert_eq!(config.thread_name, "audit-writer");
        assert_eq!(config.mode, ArgsMode::Positional);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = DispatchConfig::from_json(r#"{ "mode": "splat" }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("unknown binding mode"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(DispatchConfig::from_json(r#"{ "capacity": 4 }"#).is_err());
    }
}
