//! Event tracing and panic reporting through the `log` facade.
//!
//! Nothing is printed unless the embedding application installs a logger.

use std::any::Any;

use crate::config::EnvConfig;
use crate::tags::events::TagEvent;

pub const LOG_TARGET: &str = "tags_input";

/// Traces every emitted event at debug level when enabled (`TAGS_INPUT_DEBUG=1`).
#[derive(Debug, Clone, Copy, Default)]
pub struct EventLogger {
    enabled: bool,
}

impl EventLogger {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn from_config(config: &EnvConfig) -> Self {
        Self::new(config.debug_events)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn trace(&self, event: &TagEvent) {
        if !self.enabled {
            return;
        }
        match event.value.as_deref() {
            Some(value) => log::debug!(
                target: LOG_TARGET,
                "emit {} value={value:?} tags={:?}",
                event.kind,
                event.tags
            ),
            None => log::debug!(target: LOG_TARGET, "emit {} tags={:?}", event.kind, event.tags),
        }
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "non-string panic payload".to_string()
}
