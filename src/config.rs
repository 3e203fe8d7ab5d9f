//! Renderer configuration.

use serde::{Deserialize, Serialize};

/// What a surface-destroyed notification tears down.
///
/// Texture-surface hosts invalidate the whole context when the surface goes
/// away; surface-view hosts keep the shared context alive so a new surface
/// reattaches quickly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownPolicy {
    /// Full release on surface destroy: notify the delegate, release context
    /// and surface.
    ReleaseAll,
    /// Release only the surface binding, keeping the shared context.
    KeepContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    #[serde(default = "default_teardown")]
    pub teardown: TeardownPolicy,
    /// Delay before retrying a transient surface/binding failure.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Maximum frame rate; 0.0 leaves pacing to the frame source.
    #[serde(default)]
    pub max_fps: f64,
    /// Cadence of the periodic metrics log.
    #[serde(default = "default_metrics_interval_secs")]
    pub metrics_interval_secs: u64,
}

fn default_teardown() -> TeardownPolicy {
    TeardownPolicy::KeepContext
}
fn default_retry_delay_ms() -> u64 {
    50
}
fn default_metrics_interval_secs() -> u64 {
    1
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            teardown: default_teardown(),
            retry_delay_ms: default_retry_delay_ms(),
            max_fps: 0.0,
            metrics_interval_secs: default_metrics_interval_secs(),
        }
    }
}
