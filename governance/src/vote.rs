//! Recorded votes.

use agora_types::{ProposalId, Timestamp, VoteId, WalletAddress};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::proposal::Tally;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Yes,
    No,
    Abstain,
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Abstain => "abstain",
        })
    }
}

/// One address's vote on one proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub proposal_id: ProposalId,
    pub voter: WalletAddress,
    pub choice: VoteChoice,
    pub timestamp: Timestamp,
}

impl Tally {
    /// Count a full set of votes from scratch.
    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        let mut tally = Tally::default();
        for vote in votes {
            match vote.choice {
                VoteChoice::Yes => tally.yes += 1,
                VoteChoice::No => tally.no += 1,
                VoteChoice::Abstain => tally.abstain += 1,
            }
            tally.total += 1;
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(seed: u8, choice: VoteChoice) -> Vote {
        Vote {
            id: VoteId::new([seed; 32]),
            proposal_id: ProposalId::new([0; 32]),
            voter: WalletAddress::parse(format!("voter{seed}")).unwrap(),
            choice,
            timestamp: Timestamp::new(seed as u64),
        }
    }

    #[test]
    fn counts_each_choice() {
        let votes = vec![
            vote(1, VoteChoice::Yes),
            vote(2, VoteChoice::Yes),
            vote(3, VoteChoice::No),
            vote(4, VoteChoice::Abstain),
        ];
        let tally = Tally::from_votes(&votes);
        assert_eq!(
            tally,
            Tally {
                yes: 2,
                no: 1,
                abstain: 1,
                total: 4
            }
        );
        assert!(tally.is_consistent());
    }

    #[test]
    fn choice_parses_from_json() {
        let c: VoteChoice = serde_json::from_str("\"abstain\"").unwrap();
        assert_eq!(c, VoteChoice::Abstain);
        assert!(serde_json::from_str::<VoteChoice>("\"maybe\"").is_err());
    }
}
