//! Schema bookkeeping trait.

use crate::StoreError;

/// Tracks the on-disk schema version so backends can migrate older databases.
pub trait SchemaStore {
    /// Stored schema version; 0 for a fresh database.
    fn get_schema_version(&self) -> Result<u32, StoreError>;

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError>;
}
