//! Admission control over vote records.
//!
//! Admission, insertion, tally recompute and eager resolution of one
//! proposal all happen under that proposal's lock, so the duplicate check
//! and the insert form a single atomic step.

use std::sync::Arc;

use agora_store::{GovernanceStore, StoreError};
use agora_types::{ProposalId, Timestamp, WalletAddress};
use tracing::{debug, info};

use crate::codec::{decode, encode};
use crate::locks::ProposalLocks;
use crate::proposal::{ProposalStatus, Tally};
use crate::repository::ProposalRepository;
use crate::vote::{Vote, VoteChoice};
use crate::GovernanceError;

pub struct VoteLedger {
    store: Arc<dyn GovernanceStore>,
    proposals: Arc<ProposalRepository>,
    locks: Arc<ProposalLocks>,
}

impl VoteLedger {
    pub fn new(
        store: Arc<dyn GovernanceStore>,
        proposals: Arc<ProposalRepository>,
        locks: Arc<ProposalLocks>,
    ) -> Self {
        Self {
            store,
            proposals,
            locks,
        }
    }

    /// Record `voter`'s vote on a proposal.
    ///
    /// Checks, in order: the proposal exists, it is `Active`, its window has
    /// opened, its window has not closed (by time, whatever the stored
    /// status), and the voter has not voted yet.
    pub fn submit(
        &self,
        proposal_id: &ProposalId,
        voter: &WalletAddress,
        choice: VoteChoice,
        now: Timestamp,
    ) -> Result<Vote, GovernanceError> {
        self.locks
            .with_lock(proposal_id, || -> Result<Vote, GovernanceError> {
                let mut proposal = self
                    .proposals
                    .load(proposal_id)?
                    .ok_or_else(|| GovernanceError::proposal_not_found(proposal_id))?;

                if proposal.status != ProposalStatus::Active {
                    return Err(GovernanceError::InvalidState {
                        proposal: *proposal_id,
                        status: proposal.status,
                        action: "vote",
                    });
                }
                if now < proposal.voting_starts_at {
                    return Err(GovernanceError::TooEarly {
                        proposal: *proposal_id,
                        opens_at: proposal.voting_starts_at,
                        now,
                    });
                }
                if now > proposal.voting_ends_at {
                    // We hold the lock anyway; finalize the lapsed proposal.
                    self.proposals.settle(&mut proposal, now)?;
                    return Err(GovernanceError::TooLate {
                        proposal: *proposal_id,
                        closed_at: proposal.voting_ends_at,
                        now,
                    });
                }
                if self.store.find_vote_id(proposal_id, voter)?.is_some() {
                    return Err(GovernanceError::DuplicateVote {
                        proposal: *proposal_id,
                        voter: voter.clone(),
                    });
                }

                let mut context = proposal_id.as_bytes().to_vec();
                context.extend_from_slice(voter.as_str().as_bytes());
                let vote = Vote {
                    id: agora_crypto::new_vote_id(&context, now),
                    proposal_id: *proposal_id,
                    voter: voter.clone(),
                    choice,
                    timestamp: now,
                };
                match self
                    .store
                    .insert_vote(&vote.id, proposal_id, voter, &encode(&vote)?)
                {
                    Ok(()) => {}
                    Err(StoreError::Duplicate(_)) => {
                        return Err(GovernanceError::DuplicateVote {
                            proposal: *proposal_id,
                            voter: voter.clone(),
                        })
                    }
                    Err(e) => return Err(e.into()),
                }

                let tally = self.tally(proposal_id)?;
                self.proposals.apply_tally(&mut proposal, tally, now)?;

                info!(
                    proposal = %proposal_id,
                    %voter,
                    %choice,
                    total = tally.total,
                    status = %proposal.status,
                    "vote accepted"
                );
                Ok(vote)
            })
            .inspect_err(|e| {
                if !e.is_internal() {
                    debug!(proposal = %proposal_id, %voter, error = %e, "vote refused");
                }
            })
    }

    /// Recount a proposal's tallies from its stored votes.
    fn tally(&self, proposal_id: &ProposalId) -> Result<Tally, GovernanceError> {
        let votes = self.get_by_proposal(proposal_id)?;
        Ok(Tally::from_votes(&votes))
    }

    /// All votes cast on a proposal, oldest first. No side effects.
    pub fn get_by_proposal(&self, proposal_id: &ProposalId) -> Result<Vec<Vote>, GovernanceError> {
        let mut votes = self
            .store
            .get_votes(proposal_id)?
            .iter()
            .map(|bytes| decode::<Vote>(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        votes.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(votes)
    }

    /// The vote `voter` cast on a proposal, if any.
    pub fn get_voter_choice(
        &self,
        proposal_id: &ProposalId,
        voter: &WalletAddress,
    ) -> Result<Option<Vote>, GovernanceError> {
        let Some(vote_id) = self.store.find_vote_id(proposal_id, voter)? else {
            return Ok(None);
        };
        self.store
            .get_vote(&vote_id)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }
}
