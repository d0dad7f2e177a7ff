//! Dispatch policy configuration.
//!
//! The fallback timer durations are heuristics tuned on real devices, not
//! protocol constants, so they are carried as policy with env overrides
//! rather than hard-coded in the dispatcher.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Google Pay's Android package identifier.
pub const GPAY_PACKAGE: &str = "com.google.android.apps.nbu.paisa.user";

/// Play-Store page used as the intent URI's browser fallback.
pub const GPAY_STORE_URL: &str =
    "https://play.google.com/store/apps/details?id=com.google.android.apps.nbu.paisa.user";

/// Tunables for one platform dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchPolicy {
    /// Wait after navigating to the Android intent URI before falling back.
    pub intent_delay_ms: u64,
    /// Wait after navigating to a custom-scheme URI before the next step.
    pub scheme_delay_ms: u64,
    /// Package identifier of the target payment app.
    pub package: String,
    /// Browser fallback URL embedded (percent-encoded) in the intent URI.
    pub store_fallback_url: String,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            intent_delay_ms: 1200,
            scheme_delay_ms: 900,
            package: GPAY_PACKAGE.to_string(),
            store_fallback_url: GPAY_STORE_URL.to_string(),
        }
    }
}

impl DispatchPolicy {
    /// Defaults with `UPI_HANDOFF_INTENT_DELAY_MS` / `UPI_HANDOFF_SCHEME_DELAY_MS`
    /// environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut policy = Self::default();
        if let Some(ms) = read_ms_var("UPI_HANDOFF_INTENT_DELAY_MS")? {
            policy.intent_delay_ms = ms;
        }
        if let Some(ms) = read_ms_var("UPI_HANDOFF_SCHEME_DELAY_MS")? {
            policy.scheme_delay_ms = ms;
        }
        info!(
            intent_delay_ms = policy.intent_delay_ms,
            scheme_delay_ms = policy.scheme_delay_ms,
            "dispatch policy loaded"
        );
        Ok(policy)
    }

    pub fn intent_delay(&self) -> Duration {
        Duration::from_millis(self.intent_delay_ms)
    }

    pub fn scheme_delay(&self) -> Duration {
        Duration::from_millis(self.scheme_delay_ms)
    }
}

fn read_ms_var(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) => {
            let ms = raw
                .parse::<u64>()
                .with_context(|| format!("{name} must be a millisecond count, got {raw:?}"))?;
            Ok(Some(ms))
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {name}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tuned_values() {
        let policy = DispatchPolicy::default();
        assert_eq!(policy.intent_delay(), Duration::from_millis(1200));
        assert_eq!(policy.scheme_delay(), Duration::from_millis(900));
        assert_eq!(policy.package, GPAY_PACKAGE);
    }
}
