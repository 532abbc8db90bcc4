//! Governance proposals and their lifecycle.

use agora_types::{OrganizationId, ProposalId, Scope, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a proposal.
///
/// `Draft → Active` is triggered by the proposer; `Active → Passed | Rejected`
/// only by resolution once the voting window has closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Created with a future voting start; waiting for the proposer to activate it.
    Draft,
    /// Accepting votes.
    Active,
    Passed,
    Rejected,
}

impl ProposalStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Passed | Self::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Passed => "passed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vote counts of a proposal. `total` is always `yes + no + abstain`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub yes: u64,
    pub no: u64,
    pub abstain: u64,
    pub total: u64,
}

impl Tally {
    /// Share of yes-votes among all cast votes, in percent. `None` with no votes.
    pub fn yes_percentage(&self) -> Option<f64> {
        (self.total > 0).then(|| self.yes as f64 * 100.0 / self.total as f64)
    }

    pub fn is_consistent(&self) -> bool {
        self.yes
            .checked_add(self.no)
            .and_then(|s| s.checked_add(self.abstain))
            == Some(self.total)
    }
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    /// `None` for a global proposal.
    pub organization_id: Option<OrganizationId>,
    pub proposer: WalletAddress,
    pub title: String,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub voting_starts_at: Timestamp,
    pub voting_ends_at: Timestamp,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub abstain_votes: u64,
    pub total_votes: u64,
    /// Copied from the governance configuration at creation; never changes.
    pub quorum_required: u64,
    /// Minimum yes-percentage (0–100) of cast votes; copied at creation.
    pub passing_threshold: u8,
    pub status: ProposalStatus,
}

impl Proposal {
    pub fn scope(&self) -> Scope {
        Scope::from_org(self.organization_id.as_ref())
    }

    pub fn tally(&self) -> Tally {
        Tally {
            yes: self.yes_votes,
            no: self.no_votes,
            abstain: self.abstain_votes,
            total: self.total_votes,
        }
    }

    pub(crate) fn set_tally(&mut self, tally: Tally) {
        self.yes_votes = tally.yes;
        self.no_votes = tally.no;
        self.abstain_votes = tally.abstain;
        self.total_votes = tally.total;
    }

    /// Active and past its voting window, i.e. awaiting lazy finalization.
    pub fn is_awaiting_resolution(&self, now: Timestamp) -> bool {
        self.status == ProposalStatus::Active && now >= self.voting_ends_at
    }
}

/// Caller input for creating a proposal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewProposal {
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub voting_starts_at: Timestamp,
    pub voting_ends_at: Timestamp,
}

/// Which proposals a listing returns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ScopeFilter {
    #[default]
    All,
    /// Only proposals without an organization.
    Global,
    Organization(OrganizationId),
}

impl ScopeFilter {
    pub fn matches(&self, proposal: &Proposal) -> bool {
        match self {
            Self::All => true,
            Self::Global => proposal.organization_id.is_none(),
            Self::Organization(org) => proposal.organization_id.as_ref() == Some(org),
        }
    }
}
