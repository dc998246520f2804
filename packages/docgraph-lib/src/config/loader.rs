use crate::{
    config::{env_var, ConfigResult, Env, EnvVar},
    defaults,
};
use serde::Deserialize;
use std::time::Duration;

/// Batching behaviour of the per-request loaders.
///
/// A dispatch always carries every key collected for its batch key, so there
/// is no batch size bound to configure.
#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Milliseconds a loader collects `load` calls before it dispatches.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
}

fn default_batch_delay_ms() -> u64 {
    defaults::BATCH_DELAY_MS
}

impl LoaderConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_delay_ms: defaults::BATCH_DELAY_MS,
        }
    }
}

impl Env for LoaderConfig {
    fn inject_opt_env_vars(&mut self) -> ConfigResult<()> {
        if let Some(batch_delay_ms) = env_var::<u64>(EnvVar::BatchDelayMs)? {
            self.batch_delay_ms = batch_delay_ms;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_LOCK;

    #[test]
    fn test_batch_delay_env_var_overrides_config() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut config = LoaderConfig::default();

        std::env::set_var(EnvVar::BatchDelayMs.as_ref(), "7");
        let result = config.inject_opt_env_vars();
        std::env::remove_var(EnvVar::BatchDelayMs.as_ref());

        assert!(result.is_ok());
        assert_eq!(config.batch_delay_ms, 7);
        assert_eq!(config.batch_delay(), Duration::from_millis(7));
    }
}
