//! # arrkit
//!
//! Sonarr backend kit for declarative configuration sync.
//!
//! Everything that knows Sonarr's wire shapes lives here: the REST client,
//! the declarative config schema, the resource mappers, the ordered sync
//! stage assembly, pre-sync backups and server-to-YAML import. The
//! reconciliation semantics themselves live in the `reconcile` crate; this
//! crate only teaches them what Sonarr's resources look like.

pub mod backup;
pub mod client;
pub mod error;
pub mod import;
pub mod mappers;
pub mod schema;
pub mod stages;

pub use client::ArrClient;
pub use error::{Error, Result};
pub use import::import_instance;
pub use schema::InstanceConfig;
pub use stages::{build_context, build_stages};

/// Context table names shared by mappers and stage assembly.
pub mod tables {
    pub const TAGS: &str = "tags";
    pub const CUSTOM_FORMATS: &str = "custom_formats";
    pub const QUALITY_DEFINITIONS: &str = "quality_definitions";
}
