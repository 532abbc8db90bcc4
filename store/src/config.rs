//! Governance configuration storage trait.

use crate::StoreError;
use agora_types::{ConfigId, Scope};

/// Storage of serialized governance configurations plus a scope index that
/// points at the single active configuration of each scope.
///
/// The index and the records it points at only change together: readers of
/// `get_active_config` never see an index entry whose record was already
/// rewritten as superseded.
pub trait ConfigStore: Send + Sync {
    fn put_config(&self, id: &ConfigId, data: &[u8]) -> Result<(), StoreError>;

    fn get_config(&self, id: &ConfigId) -> Result<Option<Vec<u8>>, StoreError>;

    fn iter_configs(&self) -> Result<Vec<Vec<u8>>, StoreError>;

    /// The record the scope index points at for exactly this scope, read in
    /// one snapshot with the index.
    fn get_active_config(&self, scope: &Scope) -> Result<Option<Vec<u8>>, StoreError>;

    /// In one atomic step: store `data` under `id`, rewrite the `superseded`
    /// record if given, and point the scope index at `id`.
    fn replace_active_config(
        &self,
        scope: &Scope,
        id: &ConfigId,
        data: &[u8],
        superseded: Option<(&ConfigId, &[u8])>,
    ) -> Result<(), StoreError>;

    /// In one atomic step: rewrite the record of `id` and clear the scope
    /// index if it still points at `id`.
    fn retire_config(&self, scope: &Scope, id: &ConfigId, data: &[u8])
        -> Result<(), StoreError>;
}
