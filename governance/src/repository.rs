//! Proposal creation, activation and lazily-finalized reads.
//!
//! Every path that returns a proposal goes through [`ProposalRepository::settle`]
//! so callers never observe an `Active` proposal whose window has closed.

use std::sync::Arc;

use agora_store::GovernanceStore;
use agora_types::{ProposalId, Scope, Timestamp, WalletAddress};
use tracing::{debug, info};

use crate::codec::{decode, encode};
use crate::config::ConfigResolver;
use crate::locks::ProposalLocks;
use crate::proposal::{NewProposal, Proposal, ProposalStatus, ScopeFilter, Tally};
use crate::resolution::resolve;
use crate::GovernanceError;

/// Longest accepted proposal title.
pub const MAX_TITLE_LEN: usize = 200;

pub struct ProposalRepository {
    store: Arc<dyn GovernanceStore>,
    configs: Arc<ConfigResolver>,
    locks: Arc<ProposalLocks>,
}

impl ProposalRepository {
    pub fn new(
        store: Arc<dyn GovernanceStore>,
        configs: Arc<ConfigResolver>,
        locks: Arc<ProposalLocks>,
    ) -> Self {
        Self {
            store,
            configs,
            locks,
        }
    }

    /// Create and persist a proposal.
    ///
    /// Quorum and threshold are copied from the configuration that applies to
    /// the proposal's scope. The proposal starts `Active` when its voting
    /// window has already opened, `Draft` otherwise.
    pub fn create(
        &self,
        input: NewProposal,
        requester: &WalletAddress,
        now: Timestamp,
    ) -> Result<Proposal, GovernanceError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(GovernanceError::InvalidInput("title must not be empty".into()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(GovernanceError::InvalidInput(format!(
                "title longer than {MAX_TITLE_LEN} characters"
            )));
        }
        if input.voting_ends_at <= input.voting_starts_at {
            return Err(GovernanceError::InvalidWindow {
                starts: input.voting_starts_at,
                ends: input.voting_ends_at,
            });
        }

        let scope = Scope::from_org(input.organization_id.as_ref());
        let config = self
            .configs
            .get_config(&scope)?
            .ok_or(GovernanceError::ConfigurationMissing { scope })?;

        let status = if input.voting_starts_at <= now {
            ProposalStatus::Active
        } else {
            ProposalStatus::Draft
        };
        let proposal = Proposal {
            id: agora_crypto::new_proposal_id(requester.as_str().as_bytes(), now),
            organization_id: input.organization_id,
            proposer: requester.clone(),
            title: title.to_string(),
            description: input.description,
            created_at: now,
            updated_at: now,
            voting_starts_at: input.voting_starts_at,
            voting_ends_at: input.voting_ends_at,
            yes_votes: 0,
            no_votes: 0,
            abstain_votes: 0,
            total_votes: 0,
            quorum_required: config.quorum_required,
            passing_threshold: config.passing_threshold,
            status,
        };
        self.persist(&proposal)?;

        info!(
            proposal = %proposal.id,
            proposer = %proposal.proposer,
            scope = %proposal.scope(),
            config = %config.id,
            %status,
            "proposal created"
        );
        Ok(proposal)
    }

    /// Open a draft proposal for voting. Only the proposer may do this, and
    /// only once `voting_starts_at` has been reached.
    pub fn activate(
        &self,
        id: &ProposalId,
        requester: &WalletAddress,
        now: Timestamp,
    ) -> Result<Proposal, GovernanceError> {
        self.locks.with_lock(id, || {
            let mut proposal = self
                .load(id)?
                .ok_or_else(|| GovernanceError::proposal_not_found(id))?;

            if &proposal.proposer != requester {
                return Err(GovernanceError::Unauthorized {
                    proposal: *id,
                    requester: requester.clone(),
                });
            }
            if proposal.status != ProposalStatus::Draft {
                return Err(GovernanceError::InvalidState {
                    proposal: *id,
                    status: proposal.status,
                    action: "activate",
                });
            }
            if now < proposal.voting_starts_at {
                return Err(GovernanceError::TooEarly {
                    proposal: *id,
                    opens_at: proposal.voting_starts_at,
                    now,
                });
            }

            proposal.status = ProposalStatus::Active;
            proposal.updated_at = now;
            self.persist(&proposal)?;
            info!(proposal = %id, "proposal activated");

            // Activated after its window closed: resolve before handing it out.
            self.settle(&mut proposal, now)?;
            Ok(proposal)
        })
    }

    /// Proposals matching `filter`, newest first, each lazily finalized.
    pub fn list(
        &self,
        filter: &ScopeFilter,
        now: Timestamp,
    ) -> Result<Vec<Proposal>, GovernanceError> {
        let mut proposals = Vec::new();
        for bytes in self.store.iter_proposals()? {
            let proposal: Proposal = decode(&bytes)?;
            if !filter.matches(&proposal) {
                continue;
            }
            if proposal.is_awaiting_resolution(now) {
                if let Some(finalized) = self.finalize_if_expired(&proposal.id, now)? {
                    proposals.push(finalized);
                }
            } else {
                proposals.push(proposal);
            }
        }
        proposals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(proposals)
    }

    /// A single proposal, lazily finalized.
    pub fn get_by_id(&self, id: &ProposalId, now: Timestamp) -> Result<Proposal, GovernanceError> {
        let proposal = self
            .load(id)?
            .ok_or_else(|| GovernanceError::proposal_not_found(id))?;
        if !proposal.is_awaiting_resolution(now) {
            return Ok(proposal);
        }
        self.finalize_if_expired(id, now)?
            .ok_or_else(|| GovernanceError::proposal_not_found(id))
    }

    /// Lazy finalization: takes the proposal's lock, re-reads the record and
    /// resolves it. Shared by every read path.
    fn finalize_if_expired(
        &self,
        id: &ProposalId,
        now: Timestamp,
    ) -> Result<Option<Proposal>, GovernanceError> {
        self.locks.with_lock(id, || {
            let Some(mut proposal) = self.load(id)? else {
                return Ok(None);
            };
            self.settle(&mut proposal, now)?;
            Ok(Some(proposal))
        })
    }

    /// Apply resolution to `proposal` and persist it if the status changed.
    ///
    /// Caller must hold the proposal's lock.
    pub(crate) fn settle(
        &self,
        proposal: &mut Proposal,
        now: Timestamp,
    ) -> Result<bool, GovernanceError> {
        let next = resolve(proposal, now);
        if next == proposal.status {
            return Ok(false);
        }
        proposal.status = next;
        proposal.updated_at = now;
        self.persist(proposal)?;
        info!(
            proposal = %proposal.id,
            status = %next,
            yes = proposal.yes_votes,
            no = proposal.no_votes,
            abstain = proposal.abstain_votes,
            quorum = proposal.quorum_required,
            threshold = proposal.passing_threshold,
            "proposal finalized"
        );
        Ok(true)
    }

    /// Write recomputed tallies, then resolve eagerly and persist.
    ///
    /// Caller must hold the proposal's lock.
    pub(crate) fn apply_tally(
        &self,
        proposal: &mut Proposal,
        tally: Tally,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        debug_assert!(tally.is_consistent());
        proposal.set_tally(tally);
        proposal.updated_at = now;
        if !self.settle(proposal, now)? {
            self.persist(proposal)?;
        }
        debug!(proposal = %proposal.id, total = tally.total, "tally updated");
        Ok(())
    }

    /// Read a proposal without finalization. Used under the proposal's lock.
    pub(crate) fn load(&self, id: &ProposalId) -> Result<Option<Proposal>, GovernanceError> {
        self.store
            .get_proposal(id)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn persist(&self, proposal: &Proposal) -> Result<(), GovernanceError> {
        self.store.put_proposal(&proposal.id, &encode(proposal)?)?;
        Ok(())
    }
}
