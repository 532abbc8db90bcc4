//! LMDB implementation of VoteStore.

use agora_store::{StoreError, VoteStore};
use agora_types::{ProposalId, VoteId, WalletAddress};

use crate::governance::{vote_index_key, LmdbGovernanceStore};
use crate::LmdbError;

impl VoteStore for LmdbGovernanceStore {
    fn insert_vote(
        &self,
        id: &VoteId,
        proposal: &ProposalId,
        voter: &WalletAddress,
        data: &[u8],
    ) -> Result<(), StoreError> {
        let key = vote_index_key(proposal, voter);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let existing = self
            .vote_index_db
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?;
        if existing.is_some() {
            // Dropping the transaction aborts it.
            return Err(StoreError::Duplicate(format!(
                "vote by {voter} on proposal {proposal}"
            )));
        }
        self.votes_db
            .put(&mut wtxn, id.as_bytes().as_slice(), data)
            .map_err(LmdbError::from)?;
        self.vote_index_db
            .put(&mut wtxn, &key, id.as_bytes().as_slice())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_vote(&self, id: &VoteId) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .votes_db
            .get(&rtxn, id.as_bytes().as_slice())
            .map_err(LmdbError::from)?;
        Ok(val.map(|bytes| bytes.to_vec()))
    }

    fn find_vote_id(
        &self,
        proposal: &ProposalId,
        voter: &WalletAddress,
    ) -> Result<Option<VoteId>, StoreError> {
        let key = vote_index_key(proposal, voter);
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self.vote_index_db.get(&rtxn, &key).map_err(LmdbError::from)? {
            Some(bytes) => VoteId::from_slice(bytes)
                .map(Some)
                .map_err(|e| StoreError::Corruption(e.to_string())),
            None => Ok(None),
        }
    }

    fn get_votes(&self, proposal: &ProposalId) -> Result<Vec<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self
            .vote_index_db
            .prefix_iter(&rtxn, proposal.as_bytes().as_slice())
            .map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (_, vote_id) = entry.map_err(LmdbError::from)?;
            let vote = self
                .votes_db
                .get(&rtxn, vote_id)
                .map_err(LmdbError::from)?
                .ok_or_else(|| {
                    StoreError::Corruption(format!(
                        "vote index for proposal {proposal} points at a missing vote"
                    ))
                })?;
            results.push(vote.to_vec());
        }
        Ok(results)
    }
}
