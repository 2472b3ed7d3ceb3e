//! Lifecycle notifications.
//!
//! Emission is synchronous and follows subscription order. A panicking handler is
//! logged and skipped; the others still run. While a [`Silence`] guard is alive
//! nothing is emitted, queued or replayed.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use crate::logging::{panic_message, EventLogger, LOG_TARGET};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagEventKind {
    Add,
    Remove,
    Invalid,
    Max,
    Clear,
    Change,
}

impl TagEventKind {
    pub const ALL: [TagEventKind; 6] = [
        TagEventKind::Add,
        TagEventKind::Remove,
        TagEventKind::Invalid,
        TagEventKind::Max,
        TagEventKind::Clear,
        TagEventKind::Change,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TagEventKind::Add => "add",
            TagEventKind::Remove => "remove",
            TagEventKind::Invalid => "invalid",
            TagEventKind::Max => "max",
            TagEventKind::Clear => "clear",
            TagEventKind::Change => "change",
        }
    }
}

impl fmt::Display for TagEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload delivered to handlers. `tags` is a snapshot taken at emission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEvent {
    pub kind: TagEventKind,
    /// Set for `add`, `remove`, `invalid` and `max`.
    pub value: Option<String>,
    pub tags: Vec<String>,
}

impl TagEvent {
    pub fn new(kind: TagEventKind, value: Option<String>, tags: Vec<String>) -> Self {
        Self { kind, value, tags }
    }
}

/// Identifies one registration; returned by `subscribe`, consumed by `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type TagEventHandler = Box<dyn FnMut(&TagEvent)>;

/// Scoped suppression of emission. Restores the previous state when dropped, which
/// also happens while unwinding.
#[must_use = "emission resumes as soon as the guard is dropped"]
pub struct Silence {
    flag: Rc<Cell<bool>>,
    previous: bool,
}

impl Drop for Silence {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

#[derive(Default)]
pub struct EventEmitter {
    listeners: HashMap<TagEventKind, Vec<(SubscriptionId, TagEventHandler)>>,
    next_id: u64,
    silent: Rc<Cell<bool>>,
    logger: EventLogger,
}

impl EventEmitter {
    pub fn new(logger: EventLogger) -> Self {
        Self {
            logger,
            ..Self::default()
        }
    }

    pub fn subscribe(&mut self, kind: TagEventKind, handler: TagEventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(kind).or_default().push((id, handler));
        id
    }

    /// Removes one registration. Returns false when `id` isn't registered for `kind`.
    pub fn unsubscribe(&mut self, kind: TagEventKind, id: SubscriptionId) -> bool {
        let Some(handlers) = self.listeners.get_mut(&kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    pub fn listener_count(&self, kind: TagEventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn is_silent(&self) -> bool {
        self.silent.get()
    }

    pub fn silence(&self) -> Silence {
        let previous = self.silent.replace(true);
        Silence {
            flag: Rc::clone(&self.silent),
            previous,
        }
    }

    pub fn emit(&mut self, event: TagEvent) {
        if self.silent.get() {
            return;
        }
        self.logger.trace(&event);

        let Some(handlers) = self.listeners.get_mut(&event.kind) else {
            return;
        };
        for (id, handler) in handlers.iter_mut() {
            let result = catch_unwind(AssertUnwindSafe(|| handler(&event)));
            if let Err(payload) = result {
                log::error!(
                    target: LOG_TARGET,
                    "handler {id:?} for \"{}\" panicked: {}",
                    event.kind,
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<(TagEventKind, usize)> = TagEventKind::ALL
            .iter()
            .map(|kind| (*kind, self.listener_count(*kind)))
            .filter(|(_, count)| *count > 0)
            .collect();
        f.debug_struct("EventEmitter")
            .field("listeners", &counts)
            .field("silent", &self.silent.get())
            .finish()
    }
}
