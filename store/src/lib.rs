//! Abstract storage traits for the Agora governance engine.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The governance engine depends only on the traits and on opaque
//! serialized record bytes; encoding is the engine's concern.

pub mod config;
pub mod error;
pub mod meta;
pub mod proposal;
pub mod vote;

pub use config::ConfigStore;
pub use error::StoreError;
pub use meta::SchemaStore;
pub use proposal::ProposalStore;
pub use vote::VoteStore;

/// Everything the governance engine needs from a backend.
pub trait GovernanceStore: ProposalStore + VoteStore + ConfigStore {}

impl<T: ProposalStore + VoteStore + ConfigStore> GovernanceStore for T {}
