//! Vote storage trait.

use crate::StoreError;
use agora_types::{ProposalId, VoteId, WalletAddress};

/// Storage of serialized vote records with a unique `(proposal, voter)` index.
pub trait VoteStore: Send + Sync {
    /// Insert a vote together with its `(proposal, voter)` index entry.
    ///
    /// Both writes happen atomically. Returns [`StoreError::Duplicate`] and
    /// writes nothing if the voter already has a vote on the proposal.
    fn insert_vote(
        &self,
        id: &VoteId,
        proposal: &ProposalId,
        voter: &WalletAddress,
        data: &[u8],
    ) -> Result<(), StoreError>;

    /// Get a vote by id.
    fn get_vote(&self, id: &VoteId) -> Result<Option<Vec<u8>>, StoreError>;

    /// Look up the vote a voter cast on a proposal, via the secondary index.
    fn find_vote_id(
        &self,
        proposal: &ProposalId,
        voter: &WalletAddress,
    ) -> Result<Option<VoteId>, StoreError>;

    /// All votes recorded for a proposal.
    fn get_votes(&self, proposal: &ProposalId) -> Result<Vec<Vec<u8>>, StoreError>;
}
