//! Mapper contract - definition ⇄ native record conversion and identity.

use crate::context::Context;
use crate::error::OpError;
use crate::record::Record;
use serde_json::Value;

/// Converts one resource type between its declarative definition, the
/// backend's native representation, and the flat comparable record the
/// diff operates on.
///
/// One implementation exists per resource kind, selected when the sync
/// stages are assembled. Three families:
///
/// - plain named resources: identity is a name field
/// - composite-identity resources: identity derives from other fields and
///   must canonicalize ordering (sort before joining) so set-equal inputs
///   match regardless of declaration order
/// - singleton settings: identity is a constant, so the record always
///   matches and only ever updates
pub trait ResourceMapper {
    /// The declarative definition this mapper consumes.
    type Definition;

    /// Build the backend-shaped record for a definition.
    ///
    /// Cross-references (tag names, format names) resolve through
    /// `context`; names the context does not know are silently dropped
    /// rather than failing. Returns a precondition error only when the
    /// mapping genuinely cannot proceed (e.g. a fixed-cardinality resource
    /// whose existing server record is required but absent).
    fn to_native(&self, definition: &Self::Definition, context: &Context)
    -> Result<Value, OpError>;

    /// Project a native record down to its comparable fields, preserving
    /// the backend identifier.
    fn from_native(&self, native: &Value) -> Record;

    /// Identity key deciding whether two records denote the same resource.
    ///
    /// Must be a pure function of record content. The reconciler projects
    /// both sides through [`from_native`](Self::from_native) before keying,
    /// so implementations only ever see comparable records.
    fn identity_key(&self, record: &Record) -> String;

    /// Fields the drift comparison skips (backend-assigned identity).
    fn ignore_fields(&self) -> &[&str] {
        &["id"]
    }

    /// The `(name, id)` pair other resource types use to reference this
    /// one, extracted from a native record. `None` for types nothing
    /// references.
    fn lookup_entry(&self, native: &Value) -> Option<(String, i64)> {
        let _ = native;
        None
    }
}
