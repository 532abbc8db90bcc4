//! Proposal storage trait.

use crate::StoreError;
use agora_types::ProposalId;

/// Keyed storage of serialized proposal records.
pub trait ProposalStore: Send + Sync {
    /// Insert or replace a proposal.
    fn put_proposal(&self, id: &ProposalId, data: &[u8]) -> Result<(), StoreError>;

    /// Get a proposal by id, `None` if unknown.
    fn get_proposal(&self, id: &ProposalId) -> Result<Option<Vec<u8>>, StoreError>;

    /// All stored proposals, in no particular order.
    fn iter_proposals(&self) -> Result<Vec<Vec<u8>>, StoreError>;
}
