//! Outcome resolution for proposals whose voting window has closed.
//!
//! Pure function of the proposal's status, tallies, quorum, threshold and
//! end time. Used eagerly after every accepted vote and lazily on reads.

use agora_types::Timestamp;

use crate::proposal::{Proposal, ProposalStatus};

/// Status `proposal` should have at `now`.
///
/// - Anything but `Active` is returned unchanged, so resolving twice is a no-op.
/// - Still `Active` while `now < voting_ends_at`.
/// - `Rejected` when fewer than `quorum_required` votes were cast.
/// - Otherwise `Passed` iff the yes share of cast votes reaches `passing_threshold` percent.
pub fn resolve(proposal: &Proposal, now: Timestamp) -> ProposalStatus {
    if proposal.status != ProposalStatus::Active {
        return proposal.status;
    }
    if now < proposal.voting_ends_at {
        return proposal.status;
    }
    if proposal.total_votes < proposal.quorum_required || proposal.total_votes == 0 {
        return ProposalStatus::Rejected;
    }
    // yes / total * 100 >= threshold, in exact integer arithmetic.
    let yes_scaled = u128::from(proposal.yes_votes) * 100;
    let needed = u128::from(proposal.passing_threshold) * u128::from(proposal.total_votes);
    if yes_scaled >= needed {
        ProposalStatus::Passed
    } else {
        ProposalStatus::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::{ProposalId, WalletAddress};

    fn proposal(yes: u64, no: u64, abstain: u64, quorum: u64, threshold: u8) -> Proposal {
        Proposal {
            id: ProposalId::new([1; 32]),
            organization_id: None,
            proposer: WalletAddress::parse("alice").unwrap(),
            title: "t".into(),
            description: String::new(),
            created_at: Timestamp::new(0),
            updated_at: Timestamp::new(0),
            voting_starts_at: Timestamp::new(0),
            voting_ends_at: Timestamp::new(100),
            yes_votes: yes,
            no_votes: no,
            abstain_votes: abstain,
            total_votes: yes + no + abstain,
            quorum_required: quorum,
            passing_threshold: threshold,
            status: ProposalStatus::Active,
        }
    }

    #[test]
    fn open_window_is_unchanged() {
        let p = proposal(10, 0, 0, 1, 50);
        assert_eq!(resolve(&p, Timestamp::new(99)), ProposalStatus::Active);
    }

    #[test]
    fn closes_exactly_at_end() {
        let p = proposal(10, 0, 0, 1, 50);
        assert_eq!(resolve(&p, Timestamp::new(100)), ProposalStatus::Passed);
    }

    #[test]
    fn quorum_failure_rejects() {
        let p = proposal(2, 0, 0, 3, 50);
        assert_eq!(resolve(&p, Timestamp::new(101)), ProposalStatus::Rejected);
    }

    #[test]
    fn zero_votes_rejected() {
        let p = proposal(0, 0, 0, 1, 0);
        assert_eq!(resolve(&p, Timestamp::new(500)), ProposalStatus::Rejected);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // 1 of 2 = exactly 50%.
        assert_eq!(
            resolve(&proposal(1, 1, 0, 2, 50), Timestamp::new(101)),
            ProposalStatus::Passed
        );
        // 1 of 3 = 33.3% < 34%.
        assert_eq!(
            resolve(&proposal(1, 2, 0, 3, 34), Timestamp::new(101)),
            ProposalStatus::Rejected
        );
    }

    #[test]
    fn abstentions_count_toward_quorum_and_denominator() {
        // 2 yes of 4 cast = 50%.
        assert_eq!(
            resolve(&proposal(2, 0, 2, 4, 51), Timestamp::new(101)),
            ProposalStatus::Rejected
        );
        assert_eq!(
            resolve(&proposal(2, 0, 2, 4, 50), Timestamp::new(101)),
            ProposalStatus::Passed
        );
    }

    #[test]
    fn non_active_states_are_fixed_points() {
        for status in [
            ProposalStatus::Draft,
            ProposalStatus::Passed,
            ProposalStatus::Rejected,
        ] {
            let mut p = proposal(0, 5, 0, 1, 50);
            p.status = status;
            assert_eq!(resolve(&p, Timestamp::new(10_000)), status);
        }
    }

    #[test]
    fn idempotent_after_applying() {
        let mut p = proposal(3, 1, 0, 3, 50);
        let now = Timestamp::new(200);
        p.status = resolve(&p, now);
        assert_eq!(resolve(&p, now), p.status);
    }
}
