//! Multi-stage sync orchestration across resource types.
//!
//! Resource types are processed strictly sequentially in dependency order:
//! independent types first (tags, content rules), referencing types after
//! them, singleton settings last. After a stage whose records other types
//! reference, the orchestrator re-lists the backend and refreshes the
//! name→id lookup so later stages resolve against post-sync identifiers,
//! never pre-sync ones.

use crate::context::Context;
use crate::error::OpError;
use crate::events::EventSink;
use crate::mapper::ResourceMapper;
use crate::reconciler::Reconciler;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Outcome of one stage's reconciliation. Counts are planned items; in
/// apply mode `failed` says how many of them did not go through.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub resource: String,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub failed: usize,
    pub summary: String,
}

impl StageReport {
    pub fn changes(&self) -> usize {
        self.created + self.updated + self.deleted
    }
}

/// Aggregate outcome of one instance sync.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub stages: Vec<StageReport>,
    /// Stage-level failures (the stage could not run at all), formatted
    /// for operators.
    pub failures: Vec<String>,
}

impl SyncReport {
    /// Whether every stage ran and every item applied.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.stages.iter().all(|stage| stage.failed == 0)
    }

    pub fn total_changes(&self) -> usize {
        self.stages.iter().map(StageReport::changes).sum()
    }
}

/// One resource type in the sync order.
///
/// The static binding of a type's name, order, mapper and operations
/// (constructed once per sync run from the validated configuration), made
/// object-safe so heterogeneous definition types can share one run.
pub trait SyncStage {
    /// Human-readable resource type name.
    fn name(&self) -> &str;

    /// Sync order; lower runs first.
    fn order(&self) -> u32;

    /// Lookup table this stage provides to later stages, refreshed from
    /// the backend after the stage completes.
    fn provides(&self) -> Option<&str> {
        None
    }

    /// Record table that must be seeded from the backend before this
    /// stage maps its definitions.
    fn seeds(&self) -> Option<&str> {
        None
    }

    fn refresh_lookup(&self) -> Result<HashMap<String, i64>, OpError> {
        Ok(HashMap::new())
    }

    fn seed_records(&self) -> Result<HashMap<String, Value>, OpError> {
        Ok(HashMap::new())
    }

    fn sync(
        &self,
        context: &Context,
        dry_run: bool,
        sink: &mut dyn EventSink,
    ) -> Result<StageReport, OpError>;
}

/// Standard [`SyncStage`] backed by a [`Reconciler`] and a set of desired
/// definitions.
pub struct ResourceStage<M: ResourceMapper> {
    reconciler: Reconciler<M>,
    desired: Vec<M::Definition>,
    delete_unmanaged: bool,
    order: u32,
    provides: Option<String>,
    seeds: Option<String>,
}

impl<M: ResourceMapper> ResourceStage<M> {
    pub fn new(
        order: u32,
        reconciler: Reconciler<M>,
        desired: Vec<M::Definition>,
        delete_unmanaged: bool,
    ) -> Self {
        Self {
            reconciler,
            desired,
            delete_unmanaged,
            order,
            provides: None,
            seeds: None,
        }
    }

    /// Mark this stage as providing a lookup table to later stages.
    pub fn providing(mut self, table: impl Into<String>) -> Self {
        self.provides = Some(table.into());
        self
    }

    /// Mark this stage as needing a pre-seeded record table.
    pub fn seeded_from(mut self, table: impl Into<String>) -> Self {
        self.seeds = Some(table.into());
        self
    }
}

impl<M: ResourceMapper> SyncStage for ResourceStage<M> {
    fn name(&self) -> &str {
        self.reconciler.resource_name()
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn provides(&self) -> Option<&str> {
        self.provides.as_deref()
    }

    fn seeds(&self) -> Option<&str> {
        self.seeds.as_deref()
    }

    fn refresh_lookup(&self) -> Result<HashMap<String, i64>, OpError> {
        self.reconciler.build_lookup()
    }

    fn seed_records(&self) -> Result<HashMap<String, Value>, OpError> {
        self.reconciler.fetch_keyed_records()
    }

    fn sync(
        &self,
        context: &Context,
        dry_run: bool,
        sink: &mut dyn EventSink,
    ) -> Result<StageReport, OpError> {
        let outcome = self.reconciler.reconcile(
            &self.desired,
            self.delete_unmanaged,
            dry_run,
            context,
            sink,
        )?;
        Ok(StageReport {
            resource: self.name().to_string(),
            created: outcome.changes.to_create.len(),
            updated: outcome.changes.to_update.len(),
            deleted: outcome.changes.to_delete.len(),
            failed: outcome.errors.len(),
            summary: outcome.changes.summary(),
        })
    }
}

/// Drives stages in dependency order, refreshing the cross-resource
/// context between them.
pub struct Orchestrator {
    stages: Vec<Box<dyn SyncStage>>,
}

impl Orchestrator {
    pub fn new(mut stages: Vec<Box<dyn SyncStage>>) -> Self {
        stages.sort_by_key(|stage| stage.order());
        Self { stages }
    }

    /// Run every stage. A stage's total failure (its fetch raising) is
    /// fatal only to that stage; the run continues and the report carries
    /// the aggregate outcome.
    pub fn run(&self, context: &mut Context, dry_run: bool, sink: &mut dyn EventSink) -> SyncReport {
        let mut report = SyncReport::default();

        for stage in &self.stages {
            if let Some(table) = stage.seeds() {
                match stage.seed_records() {
                    Ok(records) => context.set_records(table.to_string(), records),
                    Err(err) => {
                        let message = err.describe();
                        log::error!("Error preparing {}: {message}", stage.name());
                        report.failures.push(format!("{}: {message}", stage.name()));
                        continue;
                    }
                }
            }

            match stage.sync(context, dry_run, sink) {
                Ok(stage_report) => report.stages.push(stage_report),
                Err(err) => {
                    let message = err.describe();
                    log::error!("Error syncing {}: {message}", stage.name());
                    report.failures.push(format!("{}: {message}", stage.name()));
                    continue;
                }
            }

            // Later stages must resolve against post-sync identifiers.
            if let Some(table) = stage.provides() {
                match stage.refresh_lookup() {
                    Ok(entries) => context.set_lookup(table.to_string(), entries),
                    Err(err) => {
                        let message = err.describe();
                        log::warn!("Could not refresh {table} lookup: {message}");
                        report.failures.push(format!("{}: {message}", stage.name()));
                    }
                }
            }
        }

        report
    }
}
