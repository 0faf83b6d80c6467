//! CRUD operation collaborators supplied by the backend integration.

use crate::error::OpError;
use serde_json::Value;

/// The four operations the engine needs for one resource type.
///
/// Implementations capture whatever client state they need and are handed
/// to the [`Reconciler`](crate::Reconciler) by value once per sync run.
/// Every call is a blocking request-response round trip.
///
/// `create` and `delete` default to [`OpError::Unsupported`] for resource
/// types with fixed cardinality (singleton settings, backend-defined
/// quality definitions); asking anyway is a call-order defect reported as
/// an isolated per-item failure.
pub trait ResourceOps {
    /// Fetch all current records of this type.
    fn list(&self) -> Result<Vec<Value>, OpError>;

    /// Create a record, returning the backend's stored form.
    fn create(&self, record: &Value) -> Result<Value, OpError> {
        let _ = record;
        Err(OpError::Unsupported)
    }

    /// Update the record with the given backend identifier.
    fn update(&self, id: i64, record: &Value) -> Result<Value, OpError>;

    /// Delete the record with the given backend identifier.
    fn delete(&self, id: i64) -> Result<(), OpError> {
        let _ = id;
        Err(OpError::Unsupported)
    }
}
