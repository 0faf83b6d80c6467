//! Structured reconciliation events.
//!
//! The engine reports progress through an [`EventSink`] instead of writing
//! to a process-wide logger, so callers choose the rendering and tests
//! assert on events rather than captured text. [`LogSink`] is the default
//! and forwards to the `log` facade.

/// The three apply phases, in their fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    pub fn gerund(self) -> &'static str {
        match self {
            Self::Create => "Creating",
            Self::Update => "Updating",
            Self::Delete => "Deleting",
        }
    }

    pub fn past(self) -> &'static str {
        match self {
            Self::Create => "Created",
            Self::Update => "Updated",
            Self::Delete => "Deleted",
        }
    }
}

/// One event from a reconciliation pass.
#[derive(Debug, Clone)]
pub struct ReconcileEvent {
    /// Human-readable resource type name, e.g. `"Custom Format"`.
    pub resource: String,
    pub kind: EventKind,
}

#[derive(Debug, Clone)]
pub enum EventKind {
    /// Reconciliation of this resource type began.
    Started,
    /// Current state fetched from the backend.
    Fetched { count: usize },
    /// A definition could not be mapped to its native form.
    MapFailed { message: String },
    /// Diff computed; `summary` is the ChangeSet summary string.
    Planned { summary: String },
    /// Dry run only: this item would be applied.
    WouldApply { action: Action, key: String },
    /// About to apply one item.
    Applying { action: Action, key: String },
    /// One item applied successfully.
    Applied { action: Action, key: String },
    /// One item failed; the pass continues.
    Failed {
        action: Action,
        key: String,
        message: String,
    },
    /// The pass finished; `errors` counts items that did not apply.
    Completed { errors: usize },
}

/// Receiver for reconciliation events.
pub trait EventSink {
    fn emit(&mut self, event: ReconcileEvent);
}

/// Default sink: renders events through the `log` facade.
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: ReconcileEvent) {
        let resource = &event.resource;
        match event.kind {
            EventKind::Started => log::info!("Reconciling {resource}..."),
            EventKind::Fetched { count } => {
                log::debug!("Found {count} existing {resource}(s) on server");
            }
            EventKind::MapFailed { message } => {
                log::error!("✗ Failed to map {resource}: {message}");
            }
            EventKind::Planned { summary } => {
                if summary == "no changes" {
                    log::info!("{resource}: no changes needed");
                } else {
                    log::info!("{resource}: {summary}");
                }
            }
            EventKind::WouldApply { action, key } => {
                log::info!("[DRY RUN] Would {} {resource}: {key}", action.verb());
            }
            EventKind::Applying { action, key } => {
                log::info!("{} {resource}: {key}", action.gerund());
            }
            EventKind::Applied { action, key } => {
                log::info!("✓ {} {resource}: {key}", action.past());
            }
            EventKind::Failed {
                action,
                key,
                message,
            } => {
                log::error!("✗ Failed to {} {resource} '{key}': {message}", action.verb());
            }
            EventKind::Completed { errors } => {
                if errors > 0 {
                    log::warn!("Completed with {errors} error(s) for {resource}");
                }
            }
        }
    }
}

/// Sink that discards everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: ReconcileEvent) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Test sink that records every event.
    #[derive(Default)]
    pub struct RecordingSink {
        pub events: Vec<ReconcileEvent>,
    }

    impl EventSink for RecordingSink {
        fn emit(&mut self, event: ReconcileEvent) {
            self.events.push(event);
        }
    }

    impl RecordingSink {
        /// Keys of events matching a predicate, in emission order.
        pub fn keys(&self, predicate: impl Fn(&EventKind) -> Option<&String>) -> Vec<String> {
            self.events
                .iter()
                .filter_map(|e| predicate(&e.kind).cloned())
                .collect()
        }
    }
}
