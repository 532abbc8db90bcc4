//! LMDB storage backend for the Agora governance engine.
//!
//! Implements the storage traits from `agora-store` using the `heed` LMDB
//! bindings. Proposals, votes, the `(proposal, voter)` vote index, governance
//! configurations and the per-scope active-config index each live in their
//! own named database inside a single environment.

pub mod config;
pub mod environment;
pub mod error;
pub mod governance;
pub mod meta;
pub mod migration;
pub mod proposal;
pub mod vote;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use governance::LmdbGovernanceStore;
pub use meta::LmdbMetaStore;
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION};
