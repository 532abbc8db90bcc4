//! LMDB-backed governance store.
//!
//! One handle implements [`ProposalStore`](agora_store::ProposalStore),
//! [`VoteStore`](agora_store::VoteStore) and
//! [`ConfigStore`](agora_store::ConfigStore); the trait impls live in the
//! sibling modules.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use agora_types::{ProposalId, Scope, WalletAddress};

pub struct LmdbGovernanceStore {
    pub(crate) env: Arc<Env>,
    pub(crate) proposals_db: Database<Bytes, Bytes>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
    pub(crate) vote_index_db: Database<Bytes, Bytes>,
    pub(crate) configs_db: Database<Bytes, Bytes>,
    pub(crate) config_scope_db: Database<Bytes, Bytes>,
}

/// Composite key `proposal_id (32 bytes) || voter`.
///
/// The fixed-width prefix makes a prefix scan over one proposal exact.
pub(crate) fn vote_index_key(proposal: &ProposalId, voter: &WalletAddress) -> Vec<u8> {
    let mut key = Vec::with_capacity(ProposalId::LEN + voter.as_str().len());
    key.extend_from_slice(proposal.as_bytes());
    key.extend_from_slice(voter.as_str().as_bytes());
    key
}

/// LMDB rejects empty keys, so every scope key carries a one-byte tag.
pub(crate) fn scope_key(scope: &Scope) -> Vec<u8> {
    let mut key = vec![b'S'];
    key.extend_from_slice(&scope.storage_key());
    key
}

#[cfg(test)]
pub(crate) fn open_test_store() -> (tempfile::TempDir, crate::LmdbEnvironment) {
    let dir = tempfile::tempdir().unwrap();
    let env = crate::LmdbEnvironment::open(dir.path(), 1 << 22).unwrap();
    (dir, env)
}
