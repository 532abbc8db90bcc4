//! Governance engine for Agora.
//!
//! Proposals move `Draft → Active → Passed | Rejected`. Votes are one
//! address, one vote. Outcomes are a pure function of the recorded tallies,
//! the quorum and passing threshold copied onto the proposal at creation,
//! and the time; resolution runs eagerly after each vote and lazily on
//! every read of a proposal whose window has closed.
//!
//! All read-modify-write work on a proposal is serialized per proposal id.

mod codec;

pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod proposal;
pub mod repository;
pub mod resolution;
pub mod vote;

pub use config::{ConfigResolver, GovernanceConfig, NewGovernanceConfig};
pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use ledger::VoteLedger;
pub use locks::ProposalLocks;
pub use proposal::{NewProposal, Proposal, ProposalStatus, ScopeFilter, Tally};
pub use repository::ProposalRepository;
pub use resolution::resolve;
pub use vote::{Vote, VoteChoice};
