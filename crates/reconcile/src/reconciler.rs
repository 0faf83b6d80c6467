//! Per-resource-type reconciliation: fetch, map, diff, apply.

use crate::compare::needs_update;
use crate::context::Context;
use crate::diff::{ChangeSet, compute_diff};
use crate::error::OpError;
use crate::events::{Action, EventKind, EventSink, ReconcileEvent};
use crate::mapper::ResourceMapper;
use crate::ops::ResourceOps;
use crate::record::{Record, record_id};
use serde_json::Value;
use std::collections::HashMap;

/// A desired item: the retained declarative definition plus its comparable
/// projection.
///
/// The definition is carried through the diff so the apply phase can
/// rebuild the native payload (the comparable record built for diffing
/// does not yet carry the identifier of a matched existing record).
#[derive(Debug)]
pub struct Desired<'a, D> {
    pub definition: &'a D,
    pub record: Record,
}

/// Result of one reconciliation pass: the planned/applied changes plus the
/// per-item failures collected along the way.
#[derive(Debug)]
pub struct Reconciliation<'a, D> {
    pub changes: ChangeSet<Desired<'a, D>>,
    /// One entry per item that failed to map or apply, already formatted
    /// for operators ("Create x: Authentication failed - ...").
    pub errors: Vec<String>,
}

impl<D> Reconciliation<'_, D> {
    /// The pass ran to the end but some items did not apply.
    pub fn completed_with_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Reconciles one resource type between declarative definitions and a
/// backend, through an injected mapper and CRUD operations.
pub struct Reconciler<M: ResourceMapper> {
    resource_name: String,
    mapper: M,
    ops: Box<dyn ResourceOps>,
}

impl<M: ResourceMapper> Reconciler<M> {
    /// `resource_name` is the human-readable type name used in events,
    /// e.g. `"Custom Format"`.
    pub fn new(resource_name: impl Into<String>, mapper: M, ops: Box<dyn ResourceOps>) -> Self {
        Self {
            resource_name: resource_name.into(),
            mapper,
            ops,
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// Reconcile desired definitions against current backend state.
    ///
    /// Fetches current records, round-trips every definition through the
    /// mapper (so comparison sees exactly the normalization the backend
    /// call will use), diffs, and - unless `dry_run` - applies the
    /// resulting changes one item at a time in create → update → delete
    /// order. A failing item is recorded and skipped; the pass continues.
    /// Only a failure to list current state aborts the pass.
    pub fn reconcile<'a>(
        &self,
        desired: &'a [M::Definition],
        delete_unmanaged: bool,
        dry_run: bool,
        context: &Context,
        sink: &mut dyn EventSink,
    ) -> Result<Reconciliation<'a, M::Definition>, OpError> {
        self.emit(sink, EventKind::Started);

        let current_native = self.ops.list()?;
        let current: Vec<Record> = current_native
            .iter()
            .map(|native| self.mapper.from_native(native))
            .collect();
        self.emit(
            sink,
            EventKind::Fetched {
                count: current.len(),
            },
        );

        let mut errors = Vec::new();

        // Round trip: definition → native → comparable. Definitions that
        // fail to map are excluded from the diff and reported like any
        // other per-item failure.
        let mut desired_records: Vec<Desired<'a, M::Definition>> =
            Vec::with_capacity(desired.len());
        for definition in desired {
            match self.mapper.to_native(definition, context) {
                Ok(native) => desired_records.push(Desired {
                    definition,
                    record: self.mapper.from_native(&native),
                }),
                Err(err) => {
                    let message = err.describe();
                    self.emit(
                        sink,
                        EventKind::MapFailed {
                            message: message.clone(),
                        },
                    );
                    errors.push(format!("Map {}: {message}", self.resource_name));
                }
            }
        }

        let changes = compute_diff(
            current,
            desired_records,
            |record| self.mapper.identity_key(record),
            |item| self.mapper.identity_key(&item.record),
            |record, item| needs_update(record, &item.record, self.mapper.ignore_fields()),
            delete_unmanaged,
        );
        self.emit(
            sink,
            EventKind::Planned {
                summary: changes.summary(),
            },
        );

        if dry_run {
            self.emit_plan(&changes, sink);
            return Ok(Reconciliation { changes, errors });
        }

        self.apply(&changes, context, &mut errors, sink);
        self.emit(
            sink,
            EventKind::Completed {
                errors: errors.len(),
            },
        );

        Ok(Reconciliation { changes, errors })
    }

    /// Build the name→id lookup other resource types resolve against.
    pub fn build_lookup(&self) -> Result<HashMap<String, i64>, OpError> {
        Ok(self
            .ops
            .list()?
            .iter()
            .filter_map(|native| self.mapper.lookup_entry(native))
            .collect())
    }

    /// Fetch current native records keyed by identity, for seeding the
    /// context record table of fixed-cardinality resource types.
    pub fn fetch_keyed_records(&self) -> Result<HashMap<String, Value>, OpError> {
        Ok(self
            .ops
            .list()?
            .into_iter()
            .map(|native| {
                let key = self.mapper.identity_key(&self.mapper.from_native(&native));
                (key, native)
            })
            .collect())
    }

    fn emit(&self, sink: &mut dyn EventSink, kind: EventKind) {
        sink.emit(ReconcileEvent {
            resource: self.resource_name.clone(),
            kind,
        });
    }

    fn emit_plan(&self, changes: &ChangeSet<Desired<'_, M::Definition>>, sink: &mut dyn EventSink) {
        for item in &changes.to_create {
            self.emit(
                sink,
                EventKind::WouldApply {
                    action: Action::Create,
                    key: self.mapper.identity_key(&item.record),
                },
            );
        }
        for (_, item) in &changes.to_update {
            self.emit(
                sink,
                EventKind::WouldApply {
                    action: Action::Update,
                    key: self.mapper.identity_key(&item.record),
                },
            );
        }
        for record in &changes.to_delete {
            self.emit(
                sink,
                EventKind::WouldApply {
                    action: Action::Delete,
                    key: self.mapper.identity_key(record),
                },
            );
        }
    }

    /// Apply one changeset sequentially, create → update → delete, with
    /// per-item error isolation.
    fn apply(
        &self,
        changes: &ChangeSet<Desired<'_, M::Definition>>,
        context: &Context,
        errors: &mut Vec<String>,
        sink: &mut dyn EventSink,
    ) {
        for item in &changes.to_create {
            let key = self.mapper.identity_key(&item.record);
            self.apply_item(Action::Create, key, errors, sink, || {
                let native = self.mapper.to_native(item.definition, context)?;
                self.ops.create(&native)?;
                Ok(())
            });
        }

        for (current, item) in &changes.to_update {
            let key = self.mapper.identity_key(&item.record);
            self.apply_item(Action::Update, key, errors, sink, || {
                let id = existing_id(current)?;
                let mut native = self.mapper.to_native(item.definition, context)?;
                // Target the matched remote record.
                if let Value::Object(map) = &mut native {
                    map.insert("id".to_string(), Value::from(id));
                }
                self.ops.update(id, &native)?;
                Ok(())
            });
        }

        for current in &changes.to_delete {
            let key = self.mapper.identity_key(current);
            self.apply_item(Action::Delete, key, errors, sink, || {
                self.ops.delete(existing_id(current)?)
            });
        }
    }

    fn apply_item(
        &self,
        action: Action,
        key: String,
        errors: &mut Vec<String>,
        sink: &mut dyn EventSink,
        op: impl FnOnce() -> Result<(), OpError>,
    ) {
        self.emit(
            sink,
            EventKind::Applying {
                action,
                key: key.clone(),
            },
        );
        match op() {
            Ok(()) => self.emit(sink, EventKind::Applied { action, key }),
            Err(err) => {
                let message = err.describe();
                self.emit(
                    sink,
                    EventKind::Failed {
                        action,
                        key: key.clone(),
                        message: message.clone(),
                    },
                );
                let verb = match action {
                    Action::Create => "Create",
                    Action::Update => "Update",
                    Action::Delete => "Delete",
                };
                errors.push(format!("{verb} {key}: {message}"));
            }
        }
    }
}

fn existing_id(record: &Record) -> Result<i64, OpError> {
    record_id(record)
        .ok_or_else(|| OpError::Precondition("existing record carries no identifier".to_string()))
}
