//! Environment configuration.

use std::env;

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// `TAGS_INPUT_DEBUG=1`: trace every emitted event at debug level.
    pub debug_events: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            debug_events: env_flag("TAGS_INPUT_DEBUG"),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}
