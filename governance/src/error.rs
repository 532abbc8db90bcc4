use agora_store::StoreError;
use agora_types::{ProposalId, Scope, Timestamp, WalletAddress};
use thiserror::Error;

use crate::proposal::ProposalStatus;

/// Errors surfaced by the governance engine.
///
/// Everything except `Store` and `Codec` is a caller-visible, recoverable
/// condition. Those two are internal faults; see [`GovernanceError::is_internal`].
#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{requester} is not the proposer of proposal {proposal}")]
    Unauthorized {
        proposal: ProposalId,
        requester: WalletAddress,
    },

    #[error("proposal {proposal} is {status}; cannot {action}")]
    InvalidState {
        proposal: ProposalId,
        status: ProposalStatus,
        action: &'static str,
    },

    #[error("proposal {proposal} opens for voting at {opens_at} (now {now})")]
    TooEarly {
        proposal: ProposalId,
        opens_at: Timestamp,
        now: Timestamp,
    },

    #[error("voting on proposal {proposal} closed at {closed_at} (now {now})")]
    TooLate {
        proposal: ProposalId,
        closed_at: Timestamp,
        now: Timestamp,
    },

    #[error("wallet {voter} has already voted on proposal {proposal}")]
    DuplicateVote {
        proposal: ProposalId,
        voter: WalletAddress,
    },

    #[error("no active governance configuration applies to scope {scope}")]
    ConfigurationMissing { scope: Scope },

    #[error("voting window must end after it starts (starts {starts}, ends {ends})")]
    InvalidWindow { starts: Timestamp, ends: Timestamp },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("codec error: {0}")]
    Codec(String),
}

impl GovernanceError {
    pub(crate) fn proposal_not_found(id: &ProposalId) -> Self {
        Self::NotFound {
            kind: "proposal",
            id: id.to_string(),
        }
    }

    /// Storage and encoding faults: not the caller's doing, not retried here.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Codec(_))
    }
}
