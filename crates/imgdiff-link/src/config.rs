//! Pairing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::TempCacheLayout;

/// Configuration for the pairing registry and its strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// How long every lookup waits before reading its index, in
    /// milliseconds. Gives the other side of a pair the chance to finish
    /// registering when both are opened in quick succession.
    pub observation_delay_ms: u64,

    /// Number of recently opened documents remembered for
    /// [`OpeningHistory`](crate::OpeningHistory).
    pub history_capacity: usize,

    /// Path segment identifying the pull-request extension's storage
    /// directory inside remote temp-cache addresses.
    pub extension_storage_marker: String,

    /// Directory under the storage marker that holds per-repo copies.
    pub temp_segment: String,
}

impl LinkerConfig {
    /// Default observation delay in milliseconds.
    pub const DEFAULT_OBSERVATION_DELAY_MS: u64 = 10;

    /// Default history capacity.
    pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

    /// Default extension storage marker.
    pub const DEFAULT_EXTENSION_STORAGE_MARKER: &'static str = "github.vscode-pull-request-github";

    /// Default temp directory name.
    pub const DEFAULT_TEMP_SEGMENT: &'static str = "temp";

    /// The observation delay as a [`Duration`].
    #[must_use]
    pub const fn observation_delay(&self) -> Duration {
        Duration::from_millis(self.observation_delay_ms)
    }

    /// The temp-cache layout described by this configuration.
    #[must_use]
    pub fn temp_cache_layout(&self) -> TempCacheLayout {
        TempCacheLayout::new(&*self.extension_storage_marker, &*self.temp_segment)
    }
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            observation_delay_ms: Self::DEFAULT_OBSERVATION_DELAY_MS,
            history_capacity: Self::DEFAULT_HISTORY_CAPACITY,
            extension_storage_marker: Self::DEFAULT_EXTENSION_STORAGE_MARKER.to_string(),
            temp_segment: Self::DEFAULT_TEMP_SEGMENT.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LinkerConfig::default();
        assert_eq!(config.observation_delay(), Duration::from_millis(10));
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.temp_cache_layout(), TempCacheLayout::default());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: LinkerConfig = serde_json::from_str(r#"{"observation_delay_ms":25}"#).unwrap();
        assert_eq!(config.observation_delay_ms, 25);
        assert_eq!(
            config.extension_storage_marker,
            LinkerConfig::DEFAULT_EXTENSION_STORAGE_MARKER
        );
    }
}
