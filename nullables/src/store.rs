//! Nullable store: thread-safe in-memory governance storage for testing.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use agora_store::{ConfigStore, ProposalStore, StoreError, VoteStore};
use agora_types::{ConfigId, ProposalId, Scope, VoteId, WalletAddress};

#[derive(Default)]
struct VoteTables {
    votes: HashMap<VoteId, Vec<u8>>,
    /// (proposal, voter) → vote id; ordered so per-proposal scans are stable.
    index: BTreeMap<(ProposalId, WalletAddress), VoteId>,
}

/// Config records and the scope index share one lock so they change together.
#[derive(Default)]
struct ConfigTables {
    records: HashMap<ConfigId, Vec<u8>>,
    active: HashMap<Scope, ConfigId>,
}

/// An in-memory implementation of every governance storage trait.
#[derive(Default)]
pub struct NullGovernanceStore {
    proposals: Mutex<HashMap<ProposalId, Vec<u8>>>,
    votes: Mutex<VoteTables>,
    configs: Mutex<ConfigTables>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl NullGovernanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored votes across all proposals.
    pub fn vote_count(&self) -> usize {
        lock(&self.votes).votes.len()
    }
}

impl ProposalStore for NullGovernanceStore {
    fn put_proposal(&self, id: &ProposalId, data: &[u8]) -> Result<(), StoreError> {
        lock(&self.proposals).insert(*id, data.to_vec());
        Ok(())
    }

    fn get_proposal(&self, id: &ProposalId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(lock(&self.proposals).get(id).cloned())
    }

    fn iter_proposals(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(lock(&self.proposals).values().cloned().collect())
    }
}

impl VoteStore for NullGovernanceStore {
    fn insert_vote(
        &self,
        id: &VoteId,
        proposal: &ProposalId,
        voter: &WalletAddress,
        data: &[u8],
    ) -> Result<(), StoreError> {
        let mut tables = lock(&self.votes);
        let key = (*proposal, voter.clone());
        if tables.index.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "vote by {voter} on proposal {proposal}"
            )));
        }
        tables.index.insert(key, *id);
        tables.votes.insert(*id, data.to_vec());
        Ok(())
    }

    fn get_vote(&self, id: &VoteId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(lock(&self.votes).votes.get(id).cloned())
    }

    fn find_vote_id(
        &self,
        proposal: &ProposalId,
        voter: &WalletAddress,
    ) -> Result<Option<VoteId>, StoreError> {
        Ok(lock(&self.votes)
            .index
            .get(&(*proposal, voter.clone()))
            .copied())
    }

    fn get_votes(&self, proposal: &ProposalId) -> Result<Vec<Vec<u8>>, StoreError> {
        let tables = lock(&self.votes);
        tables
            .index
            .iter()
            .filter(|((p, _), _)| p == proposal)
            .map(|(_, id)| {
                tables
                    .votes
                    .get(id)
                    .cloned()
                    .ok_or_else(|| StoreError::Corruption(format!("dangling vote index {id}")))
            })
            .collect()
    }
}

impl ConfigStore for NullGovernanceStore {
    fn put_config(&self, id: &ConfigId, data: &[u8]) -> Result<(), StoreError> {
        lock(&self.configs).records.insert(*id, data.to_vec());
        Ok(())
    }

    fn get_config(&self, id: &ConfigId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(lock(&self.configs).records.get(id).cloned())
    }

    fn iter_configs(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(lock(&self.configs).records.values().cloned().collect())
    }

    fn get_active_config(&self, scope: &Scope) -> Result<Option<Vec<u8>>, StoreError> {
        let tables = lock(&self.configs);
        let Some(id) = tables.active.get(scope) else {
            return Ok(None);
        };
        tables
            .records
            .get(id)
            .cloned()
            .map(Some)
            .ok_or_else(|| StoreError::Corruption(format!("dangling scope index {id}")))
    }

    fn replace_active_config(
        &self,
        scope: &Scope,
        id: &ConfigId,
        data: &[u8],
        superseded: Option<(&ConfigId, &[u8])>,
    ) -> Result<(), StoreError> {
        let mut tables = lock(&self.configs);
        if let Some((old_id, old_data)) = superseded {
            tables.records.insert(*old_id, old_data.to_vec());
        }
        tables.records.insert(*id, data.to_vec());
        tables.active.insert(scope.clone(), *id);
        Ok(())
    }

    fn retire_config(
        &self,
        scope: &Scope,
        id: &ConfigId,
        data: &[u8],
    ) -> Result<(), StoreError> {
        let mut tables = lock(&self.configs);
        tables.records.insert(*id, data.to_vec());
        if tables.active.get(scope) == Some(id) {
            tables.active.remove(scope);
        }
        Ok(())
    }
}
