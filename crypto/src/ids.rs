//! Opaque id generation.

use std::sync::atomic::{AtomicU64, Ordering};

use agora_types::{ConfigId, ProposalId, Timestamp, VoteId};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use tracing::warn;

type Blake2b256 = Blake2b<U32>;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Blake2b-256 over several byte slices in sequence.
pub fn digest(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Random nonce from `fill`, or all zeroes if no entropy is available. Ids
/// stay unique through the sequence counter but become predictable.
fn nonce_from(fill: impl FnOnce(&mut [u8]) -> Result<(), getrandom::Error>) -> [u8; 16] {
    let mut nonce = [0u8; 16];
    if let Err(e) = fill(&mut nonce) {
        warn!(error = %e, "OS entropy unavailable; ids fall back to sequence and time");
        nonce = [0u8; 16];
    }
    nonce
}

fn fresh(tag: &[u8], context: &[u8], now: Timestamp) -> [u8; 32] {
    derive(tag, &nonce_from(getrandom::getrandom), context, now)
}

fn derive(tag: &[u8], nonce: &[u8; 16], context: &[u8], now: Timestamp) -> [u8; 32] {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    digest(&[
        tag,
        nonce,
        &seq.to_be_bytes(),
        &std::process::id().to_be_bytes(),
        &now.as_secs().to_be_bytes(),
        context,
    ])
}

/// New proposal id; `context` is typically the proposer address.
pub fn new_proposal_id(context: &[u8], now: Timestamp) -> ProposalId {
    ProposalId::new(fresh(b"agora/proposal", context, now))
}

/// New vote id; `context` is typically proposal id plus voter address.
pub fn new_vote_id(context: &[u8], now: Timestamp) -> VoteId {
    VoteId::new(fresh(b"agora/vote", context, now))
}

pub fn new_config_id(context: &[u8], now: Timestamp) -> ConfigId {
    ConfigId::new(fresh(b"agora/config", context, now))
}
