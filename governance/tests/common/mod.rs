//! Shared fixtures for governance integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use agora_governance::{GovernanceEngine, NewGovernanceConfig, NewProposal, Proposal};
use agora_nullables::{NullClock, NullGovernanceStore};
use agora_types::{OrganizationId, Timestamp, WalletAddress};

pub const T0: u64 = 1_000;

pub struct Harness {
    pub engine: GovernanceEngine,
    pub clock: Arc<NullClock>,
    pub store: Arc<NullGovernanceStore>,
}

pub fn wallet(name: &str) -> WalletAddress {
    WalletAddress::parse(format!("agora_{name}")).unwrap()
}

pub fn org(name: &str) -> OrganizationId {
    OrganizationId::parse(name).unwrap()
}

/// Engine over in-memory storage with the clock at `T0`.
pub fn harness() -> Harness {
    let clock = Arc::new(NullClock::new(T0));
    let store = Arc::new(NullGovernanceStore::new());
    let engine = GovernanceEngine::new(store.clone(), clock.clone());
    Harness {
        engine,
        clock,
        store,
    }
}

/// Harness with a global config of quorum 3, threshold 50%.
pub fn configured() -> Harness {
    let h = harness();
    h.engine
        .create_governance_config(global_config(3, 50))
        .unwrap();
    h
}

pub fn global_config(quorum: u64, threshold: u8) -> NewGovernanceConfig {
    NewGovernanceConfig {
        organization_id: None,
        quorum_required: quorum,
        passing_threshold: threshold,
        is_active: true,
    }
}

pub fn window(starts: u64, ends: u64) -> NewProposal {
    NewProposal {
        organization_id: None,
        title: "Fund the community garden".to_string(),
        description: "Allocate the spring budget.".to_string(),
        voting_starts_at: Timestamp::new(starts),
        voting_ends_at: Timestamp::new(ends),
    }
}

/// Active proposal with voting window `[T0, T0 + 100]`.
pub fn open_proposal(h: &Harness, proposer: &str) -> Proposal {
    h.engine
        .create_proposal(window(T0, T0 + 100), &wallet(proposer))
        .unwrap()
}
