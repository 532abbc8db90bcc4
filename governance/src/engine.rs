//! The governance service surface over repository, ledger and
//! configuration resolver.
//!
//! Reads the clock once per call so every timing decision within one
//! operation sees the same `now`. Internal faults are logged here and
//! handed back to the caller unchanged.

use std::sync::Arc;

use agora_store::GovernanceStore;
use agora_types::{Clock, ConfigId, ProposalId, Scope, WalletAddress};
use tracing::error;

use crate::config::{ConfigResolver, GovernanceConfig, NewGovernanceConfig};
use crate::ledger::VoteLedger;
use crate::locks::ProposalLocks;
use crate::proposal::{NewProposal, Proposal, ScopeFilter};
use crate::repository::ProposalRepository;
use crate::vote::{Vote, VoteChoice};
use crate::GovernanceError;

pub struct GovernanceEngine {
    clock: Arc<dyn Clock>,
    configs: Arc<ConfigResolver>,
    proposals: Arc<ProposalRepository>,
    votes: VoteLedger,
}

/// Log storage and codec faults once, at the service boundary.
fn observe<T>(op: &'static str, result: Result<T, GovernanceError>) -> Result<T, GovernanceError> {
    if let Err(e) = &result {
        if e.is_internal() {
            error!(op, error = %e, "governance storage fault");
        }
    }
    result
}

impl GovernanceEngine {
    pub fn new(store: Arc<dyn GovernanceStore>, clock: Arc<dyn Clock>) -> Self {
        let locks = Arc::new(ProposalLocks::new());
        let configs = Arc::new(ConfigResolver::new(Arc::clone(&store)));
        let proposals = Arc::new(ProposalRepository::new(
            Arc::clone(&store),
            Arc::clone(&configs),
            Arc::clone(&locks),
        ));
        let votes = VoteLedger::new(store, Arc::clone(&proposals), locks);
        Self {
            clock,
            configs,
            proposals,
            votes,
        }
    }

    pub fn create_proposal(
        &self,
        input: NewProposal,
        requester: &WalletAddress,
    ) -> Result<Proposal, GovernanceError> {
        let now = self.clock.now();
        observe(
            "create_proposal",
            self.proposals.create(input, requester, now),
        )
    }

    pub fn activate_proposal(
        &self,
        id: &ProposalId,
        requester: &WalletAddress,
    ) -> Result<Proposal, GovernanceError> {
        let now = self.clock.now();
        observe(
            "activate_proposal",
            self.proposals.activate(id, requester, now),
        )
    }

    pub fn list_proposals(&self, filter: &ScopeFilter) -> Result<Vec<Proposal>, GovernanceError> {
        let now = self.clock.now();
        observe("list_proposals", self.proposals.list(filter, now))
    }

    pub fn get_proposal(&self, id: &ProposalId) -> Result<Proposal, GovernanceError> {
        let now = self.clock.now();
        observe("get_proposal", self.proposals.get_by_id(id, now))
    }

    pub fn submit_vote(
        &self,
        proposal_id: &ProposalId,
        voter: &WalletAddress,
        choice: VoteChoice,
    ) -> Result<Vote, GovernanceError> {
        let now = self.clock.now();
        observe(
            "submit_vote",
            self.votes.submit(proposal_id, voter, choice, now),
        )
    }

    pub fn get_votes_for_proposal(&self, id: &ProposalId) -> Result<Vec<Vote>, GovernanceError> {
        observe("get_votes_for_proposal", self.votes.get_by_proposal(id))
    }

    pub fn get_voter_choice(
        &self,
        id: &ProposalId,
        voter: &WalletAddress,
    ) -> Result<Option<Vote>, GovernanceError> {
        observe("get_voter_choice", self.votes.get_voter_choice(id, voter))
    }

    pub fn create_governance_config(
        &self,
        input: NewGovernanceConfig,
    ) -> Result<GovernanceConfig, GovernanceError> {
        let now = self.clock.now();
        observe("create_governance_config", self.configs.create(input, now))
    }

    /// The configuration a new proposal in `scope` would copy.
    pub fn get_governance_config(
        &self,
        scope: &Scope,
    ) -> Result<Option<GovernanceConfig>, GovernanceError> {
        observe("get_governance_config", self.configs.get_config(scope))
    }

    pub fn list_governance_configs(&self) -> Result<Vec<GovernanceConfig>, GovernanceError> {
        observe("list_governance_configs", self.configs.list())
    }

    pub fn deactivate_governance_config(
        &self,
        id: &ConfigId,
    ) -> Result<GovernanceConfig, GovernanceError> {
        observe(
            "deactivate_governance_config",
            self.configs.deactivate(id),
        )
    }
}
