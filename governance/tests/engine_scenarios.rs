//! End-to-end behaviour of the governance engine over in-memory storage.

mod common;

use agora_governance::{GovernanceError, ProposalStatus, ScopeFilter, VoteChoice};
use agora_types::{Scope, Timestamp};
use common::*;

// ── Scenarios ────────────────────────────────────────────────────────────

#[test]
fn scenario_a_quorum_not_met_is_rejected() {
    let h = configured();
    let p = open_proposal(&h, "alice");
    assert_eq!(p.status, ProposalStatus::Active);

    h.engine.submit_vote(&p.id, &wallet("v1"), VoteChoice::Yes).unwrap();
    h.engine.submit_vote(&p.id, &wallet("v2"), VoteChoice::Yes).unwrap();

    h.clock.set(T0 + 101);
    let resolved = h.engine.get_proposal(&p.id).unwrap();
    assert_eq!(resolved.status, ProposalStatus::Rejected);
    assert_eq!(resolved.yes_votes, 2);
}

#[test]
fn scenario_b_two_thirds_yes_passes() {
    let h = configured();
    let p = open_proposal(&h, "alice");
    h.engine.submit_vote(&p.id, &wallet("v1"), VoteChoice::Yes).unwrap();
    h.engine.submit_vote(&p.id, &wallet("v2"), VoteChoice::Yes).unwrap();
    h.engine.submit_vote(&p.id, &wallet("v3"), VoteChoice::No).unwrap();

    h.clock.set(T0 + 101);
    let resolved = h.engine.get_proposal(&p.id).unwrap();
    assert_eq!(resolved.status, ProposalStatus::Passed);
    assert!(resolved.tally().yes_percentage().unwrap() > 66.0);
}

#[test]
fn scenario_c_one_third_yes_rejects() {
    let h = configured();
    let p = open_proposal(&h, "alice");
    h.engine.submit_vote(&p.id, &wallet("v1"), VoteChoice::Yes).unwrap();
    h.engine.submit_vote(&p.id, &wallet("v2"), VoteChoice::No).unwrap();
    h.engine.submit_vote(&p.id, &wallet("v3"), VoteChoice::No).unwrap();

    h.clock.set(T0 + 101);
    assert_eq!(
        h.engine.get_proposal(&p.id).unwrap().status,
        ProposalStatus::Rejected
    );
}

#[test]
fn scenario_d_second_vote_is_duplicate() {
    let h = configured();
    let p = open_proposal(&h, "alice");
    h.engine.submit_vote(&p.id, &wallet("v1"), VoteChoice::Yes).unwrap();

    let err = h
        .engine
        .submit_vote(&p.id, &wallet("v1"), VoteChoice::No)
        .unwrap_err();
    assert!(matches!(err, GovernanceError::DuplicateVote { .. }));

    let p = h.engine.get_proposal(&p.id).unwrap();
    assert_eq!((p.yes_votes, p.no_votes, p.total_votes), (1, 0, 1));
    assert_eq!(h.engine.get_votes_for_proposal(&p.id).unwrap().len(), 1);
}

#[test]
fn scenario_e_activation_guards() {
    let h = configured();
    let draft = h
        .engine
        .create_proposal(window(T0 + 50, T0 + 150), &wallet("alice"))
        .unwrap();
    assert_eq!(draft.status, ProposalStatus::Draft);

    let err = h
        .engine
        .activate_proposal(&draft.id, &wallet("mallory"))
        .unwrap_err();
    assert!(matches!(err, GovernanceError::Unauthorized { .. }));

    let err = h
        .engine
        .activate_proposal(&draft.id, &wallet("alice"))
        .unwrap_err();
    assert!(matches!(err, GovernanceError::TooEarly { .. }));

    h.clock.set(T0 + 50);
    let active = h
        .engine
        .activate_proposal(&draft.id, &wallet("alice"))
        .unwrap();
    assert_eq!(active.status, ProposalStatus::Active);
    assert_eq!(active.updated_at, Timestamp::new(T0 + 50));
}

// ── Creation ─────────────────────────────────────────────────────────────

#[test]
fn creation_without_config_fails_fast() {
    let h = harness();
    let err = h
        .engine
        .create_proposal(window(T0, T0 + 100), &wallet("alice"))
        .unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::ConfigurationMissing {
            scope: Scope::Global
        }
    ));
}

#[test]
fn creation_rejects_inverted_or_empty_window() {
    let h = configured();
    for (starts, ends) in [(T0 + 10, T0 + 10), (T0 + 10, T0)] {
        let err = h
            .engine
            .create_proposal(window(starts, ends), &wallet("alice"))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidWindow { .. }));
    }
}

#[test]
fn creation_rejects_blank_title() {
    let h = configured();
    let mut input = window(T0, T0 + 10);
    input.title = "   ".into();
    assert!(matches!(
        h.engine.create_proposal(input, &wallet("alice")),
        Err(GovernanceError::InvalidInput(_))
    ));
}

#[test]
fn creation_copies_config_and_zeroes_tallies() {
    let h = configured();
    let p = open_proposal(&h, "alice");
    assert_eq!(p.quorum_required, 3);
    assert_eq!(p.passing_threshold, 50);
    assert_eq!(p.proposer, wallet("alice"));
    assert_eq!(
        (p.yes_votes, p.no_votes, p.abstain_votes, p.total_votes),
        (0, 0, 0, 0)
    );
    assert_eq!(p.created_at, Timestamp::new(T0));
}

#[test]
fn config_change_does_not_affect_existing_proposals() {
    let h = configured();
    let p = open_proposal(&h, "alice");
    h.engine
        .create_governance_config(global_config(1, 90))
        .unwrap();

    let later = open_proposal(&h, "bob");
    assert_eq!(later.quorum_required, 1);
    let p = h.engine.get_proposal(&p.id).unwrap();
    assert_eq!((p.quorum_required, p.passing_threshold), (3, 50));
}

#[test]
fn org_proposal_uses_org_config_over_global() {
    let h = configured();
    h.engine
        .create_governance_config(agora_governance::NewGovernanceConfig {
            organization_id: Some(org("guild")),
            quorum_required: 1,
            passing_threshold: 75,
            is_active: true,
        })
        .unwrap();

    let mut input = window(T0, T0 + 100);
    input.organization_id = Some(org("guild"));
    let scoped = h.engine.create_proposal(input, &wallet("alice")).unwrap();
    assert_eq!((scoped.quorum_required, scoped.passing_threshold), (1, 75));

    let mut input = window(T0, T0 + 100);
    input.organization_id = Some(org("elsewhere"));
    let fallback = h.engine.create_proposal(input, &wallet("alice")).unwrap();
    assert_eq!((fallback.quorum_required, fallback.passing_threshold), (3, 50));
}

// ── Activation ───────────────────────────────────────────────────────────

#[test]
fn activate_unknown_and_non_draft() {
    let h = configured();
    let err = h
        .engine
        .activate_proposal(&agora_types::ProposalId::new([7; 32]), &wallet("alice"))
        .unwrap_err();
    assert!(matches!(err, GovernanceError::NotFound { .. }));

    let active = open_proposal(&h, "alice");
    let err = h
        .engine
        .activate_proposal(&active.id, &wallet("alice"))
        .unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::InvalidState {
            status: ProposalStatus::Active,
            ..
        }
    ));
}

#[test]
fn unauthorized_is_checked_before_timing() {
    let h = configured();
    let draft = h
        .engine
        .create_proposal(window(T0 + 50, T0 + 150), &wallet("alice"))
        .unwrap();
    // Both wrong requester and too early: authorization wins.
    let err = h
        .engine
        .activate_proposal(&draft.id, &wallet("bob"))
        .unwrap_err();
    assert!(matches!(err, GovernanceError::Unauthorized { .. }));
}

#[test]
fn activating_after_window_closed_resolves_immediately() {
    let h = configured();
    let draft = h
        .engine
        .create_proposal(window(T0 + 10, T0 + 20), &wallet("alice"))
        .unwrap();
    h.clock.set(T0 + 30);
    let p = h
        .engine
        .activate_proposal(&draft.id, &wallet("alice"))
        .unwrap();
    assert_eq!(p.status, ProposalStatus::Rejected);
}

// ── Voting ───────────────────────────────────────────────────────────────

#[test]
fn vote_on_draft_is_invalid_state() {
    let h = configured();
    let draft = h
        .engine
        .create_proposal(window(T0 + 50, T0 + 150), &wallet("alice"))
        .unwrap();
    h.clock.set(T0 + 60);
    let err = h
        .engine
        .submit_vote(&draft.id, &wallet("v1"), VoteChoice::Yes)
        .unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::InvalidState {
            status: ProposalStatus::Draft,
            ..
        }
    ));
}

#[test]
fn vote_on_unknown_proposal_is_not_found() {
    let h = configured();
    let err = h
        .engine
        .submit_vote(
            &agora_types::ProposalId::new([1; 32]),
            &wallet("v1"),
            VoteChoice::Yes,
        )
        .unwrap_err();
    assert!(matches!(err, GovernanceError::NotFound { .. }));
}

#[test]
fn late_vote_rejected_even_before_finalization() {
    let h = configured();
    let p = open_proposal(&h, "alice");
    h.clock.set(T0 + 101);

    // Stored status is still Active: nobody has read the proposal yet.
    let err = h
        .engine
        .submit_vote(&p.id, &wallet("v1"), VoteChoice::Yes)
        .unwrap_err();
    assert!(matches!(err, GovernanceError::TooLate { .. }));
    assert_eq!(h.store.vote_count(), 0);

    // The refused vote finalized the lapsed proposal while holding its lock.
    assert_eq!(
        h.engine.get_proposal(&p.id).unwrap().status,
        ProposalStatus::Rejected
    );
}

#[test]
fn vote_at_exact_close_is_admitted_and_resolves_eagerly() {
    let h = harness();
    h.engine
        .create_governance_config(global_config(1, 50))
        .unwrap();
    let p = open_proposal(&h, "alice");

    h.clock.set(T0 + 100);
    h.engine.submit_vote(&p.id, &wallet("v1"), VoteChoice::Yes).unwrap();
    // Eager resolution persisted the terminal state; a raw list shows it.
    let listed = h.engine.list_proposals(&ScopeFilter::All).unwrap();
    assert_eq!(listed[0].status, ProposalStatus::Passed);
}

#[test]
fn tallies_track_every_choice() {
    let h = configured();
    let p = open_proposal(&h, "alice");
    let choices = [
        VoteChoice::Yes,
        VoteChoice::No,
        VoteChoice::Abstain,
        VoteChoice::Yes,
        VoteChoice::Abstain,
    ];
    for (i, choice) in choices.iter().enumerate() {
        h.clock.set(T0 + i as u64);
        h.engine
            .submit_vote(&p.id, &wallet(&format!("v{i}")), *choice)
            .unwrap();
        let current = h.engine.get_proposal(&p.id).unwrap();
        assert!(current.tally().is_consistent());
        assert_eq!(current.total_votes, i as u64 + 1);
    }
    let p = h.engine.get_proposal(&p.id).unwrap();
    assert_eq!((p.yes_votes, p.no_votes, p.abstain_votes), (2, 1, 2));
    assert_eq!(p.updated_at, Timestamp::new(T0 + 4));
}

#[test]
fn voter_choice_lookup() {
    let h = configured();
    let p = open_proposal(&h, "alice");
    assert_eq!(h.engine.get_voter_choice(&p.id, &wallet("v1")).unwrap(), None);

    let vote = h
        .engine
        .submit_vote(&p.id, &wallet("v1"), VoteChoice::Abstain)
        .unwrap();
    let found = h
        .engine
        .get_voter_choice(&p.id, &wallet("v1"))
        .unwrap()
        .unwrap();
    assert_eq!(found, vote);
    assert_eq!(found.choice, VoteChoice::Abstain);
}

#[test]
fn votes_listed_oldest_first() {
    let h = configured();
    let p = open_proposal(&h, "alice");
    for (i, name) in ["zed", "amy", "kim"].iter().enumerate() {
        h.clock.set(T0 + i as u64 * 10);
        h.engine.submit_vote(&p.id, &wallet(name), VoteChoice::Yes).unwrap();
    }
    let voters: Vec<String> = h
        .engine
        .get_votes_for_proposal(&p.id)
        .unwrap()
        .into_iter()
        .map(|v| v.voter.to_string())
        .collect();
    assert_eq!(voters, vec!["agora_zed", "agora_amy", "agora_kim"]);
}

// ── Reads and lazy finalization ──────────────────────────────────────────

#[test]
fn list_finalizes_and_orders_newest_first() {
    let h = configured();
    let first = open_proposal(&h, "alice");
    h.clock.set(T0 + 5);
    let second = h
        .engine
        .create_proposal(window(T0 + 5, T0 + 500), &wallet("bob"))
        .unwrap();

    h.clock.set(T0 + 200);
    let listed = h.engine.list_proposals(&ScopeFilter::All).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[0].status, ProposalStatus::Active);
    assert_eq!(listed[1].id, first.id);
    assert_eq!(listed[1].status, ProposalStatus::Rejected);
    assert_eq!(listed[1].updated_at, Timestamp::new(T0 + 200));
}

#[test]
fn finalization_is_persisted_once() {
    let h = configured();
    let p = open_proposal(&h, "alice");
    h.clock.set(T0 + 150);
    let first = h.engine.get_proposal(&p.id).unwrap();
    h.clock.set(T0 + 900);
    let second = h.engine.get_proposal(&p.id).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.updated_at, Timestamp::new(T0 + 150));
}

#[test]
fn list_filters_by_scope() {
    let h = configured();
    let global = open_proposal(&h, "alice");
    let mut input = window(T0, T0 + 100);
    input.organization_id = Some(org("guild"));
    let scoped = h.engine.create_proposal(input, &wallet("bob")).unwrap();

    let ids = |filter: ScopeFilter| -> Vec<_> {
        h.engine
            .list_proposals(&filter)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect()
    };
    assert_eq!(ids(ScopeFilter::Global), vec![global.id]);
    assert_eq!(ids(ScopeFilter::Organization(org("guild"))), vec![scoped.id]);
    assert!(ids(ScopeFilter::Organization(org("nobody"))).is_empty());
    assert_eq!(ids(ScopeFilter::All).len(), 2);
}

#[test]
fn get_unknown_is_not_found() {
    let h = configured();
    let err = h
        .engine
        .get_proposal(&agora_types::ProposalId::new([5; 32]))
        .unwrap_err();
    assert!(matches!(err, GovernanceError::NotFound { .. }));
    assert!(!err.is_internal());
}

#[test]
fn draft_is_never_finalized_by_reads() {
    let h = configured();
    let draft = h
        .engine
        .create_proposal(window(T0 + 10, T0 + 20), &wallet("alice"))
        .unwrap();
    h.clock.set(T0 + 1_000);
    assert_eq!(
        h.engine.get_proposal(&draft.id).unwrap().status,
        ProposalStatus::Draft
    );
}

// ── Configuration surface ────────────────────────────────────────────────

#[test]
fn governance_config_lookup_and_deactivation() {
    let h = harness();
    assert_eq!(h.engine.get_governance_config(&Scope::Global).unwrap(), None);

    let cfg = h
        .engine
        .create_governance_config(global_config(2, 60))
        .unwrap();
    assert_eq!(
        h.engine.get_governance_config(&Scope::Global).unwrap(),
        Some(cfg.clone())
    );
    assert_eq!(h.engine.list_governance_configs().unwrap().len(), 1);

    h.engine.deactivate_governance_config(&cfg.id).unwrap();
    assert_eq!(h.engine.get_governance_config(&Scope::Global).unwrap(), None);
    let err = h
        .engine
        .create_proposal(window(T0, T0 + 100), &wallet("alice"))
        .unwrap_err();
    assert!(matches!(err, GovernanceError::ConfigurationMissing { .. }));
}
