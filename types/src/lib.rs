//! Fundamental types for the Agora governance engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! record identifiers, wallet addresses, organization scopes, and timestamps.

pub mod address;
pub mod error;
pub mod id;
pub mod organization;
pub mod time;

pub use address::WalletAddress;
pub use error::TypesError;
pub use id::{ConfigId, ProposalId, VoteId};
pub use organization::{OrganizationId, Scope};
pub use time::{Clock, SystemClock, Timestamp};
