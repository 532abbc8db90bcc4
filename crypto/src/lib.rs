//! Identifier derivation for the Agora governance engine.
//!
//! Record ids are Blake2b-256 digests over a domain tag, fresh OS randomness,
//! and a process-wide sequence number, so two ids never collide even when the
//! OS entropy source is unavailable.

pub mod ids;

pub use ids::{digest, new_config_id, new_proposal_id, new_vote_id};
