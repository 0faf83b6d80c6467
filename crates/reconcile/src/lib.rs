//! # Reconcile
//!
//! A generic reconciliation engine for resource-oriented CRUD backends.
//!
//! Given a set of desired resource records and the records currently held by
//! a backend, this crate computes the minimal create/update/delete set and
//! applies it through caller-supplied operation collaborators. The engine
//! performs no network I/O itself and knows nothing about the shape of any
//! specific resource type.
//!
//! ## Core Concepts
//!
//! - **Record**: a flat key-value projection of a backend resource, used
//!   only for diffing ([`Record`])
//! - **ResourceMapper**: converts declarative definitions to the backend's
//!   native representation and back to comparable records
//! - **ResourceOps**: the four CRUD operations for one resource type
//! - **Reconciler**: fetch, map, diff and apply for one resource type
//! - **Orchestrator**: drives multiple reconcilers in dependency order,
//!   refreshing cross-resource lookups between stages
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{Context, LogSink, Reconciler, ResourceMapper, ResourceOps};
//!
//! let reconciler = Reconciler::new("Tag", TagMapper, Box::new(tag_ops));
//! let outcome = reconciler.reconcile(
//!     &desired_tags,
//!     false, // keep unmanaged records
//!     false, // apply for real
//!     &Context::new(),
//!     &mut LogSink,
//! )?;
//! println!("{}", outcome.changes.summary());
//! ```
//!
//! ## Provider Traits
//!
//! The crate uses traits for dependency injection:
//!
//! - [`ResourceMapper`]: definition ⇄ native record conversion and identity
//! - [`ResourceOps`]: list/create/update/delete against the backend
//! - [`EventSink`]: receives structured reconciliation events
//!
//! This keeps the engine free of hard dependencies on any HTTP client,
//! config format or terminal UI.

pub mod compare;
pub mod context;
pub mod diff;
pub mod error;
pub mod events;
pub mod mapper;
pub mod ops;
pub mod orchestrator;
pub mod reconciler;
pub mod record;

// Re-export main types at crate root
pub use compare::{DEFAULT_IGNORE_FIELDS, needs_update};
pub use context::Context;
pub use diff::{ChangeSet, compute_diff};
pub use error::OpError;
pub use events::{Action, EventKind, EventSink, LogSink, NullSink, ReconcileEvent};
pub use mapper::ResourceMapper;
pub use ops::ResourceOps;
pub use orchestrator::{Orchestrator, ResourceStage, StageReport, SyncReport, SyncStage};
pub use reconciler::{Desired, Reconciler, Reconciliation};
pub use record::{Record, record_id};
