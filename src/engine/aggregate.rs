//! Vote aggregation: partition a batch by target project.
//!
//! Votes naming a project that is not in the roster are dropped. They are
//! counted in the result but never raise an error.

use std::collections::HashMap;

use log::debug;

use crate::types::{Round, Vote};

/// A vote batch partitioned along the round's roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionedVotes {
    /// One slot per project, in roster order. `None` means the batch did
    /// not mention the project; `Some(votes)` replaces its vote set.
    pub by_project: Vec<Option<Vec<Vote>>>,

    /// Votes that landed on an existing project
    pub applied: u64,

    /// Votes whose `project_ref` matched nothing
    pub ignored: u64,
}

impl PartitionedVotes {
    /// Number of projects the batch mentioned.
    pub fn projects_touched(&self) -> usize {
        self.by_project.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn votes_for(&self, index: usize) -> Option<&[Vote]> {
        self.by_project.get(index)?.as_deref()
    }
}

/// Partition `votes` by `project_ref`, preserving batch order within a project.
pub fn partition_votes(round: &Round, votes: &[Vote]) -> PartitionedVotes {
    let index: HashMap<&str, usize> = round
        .projects
        .iter()
        .enumerate()
        .map(|(i, project)| (project.id.as_str(), i))
        .collect();

    let mut partitioned = PartitionedVotes {
        by_project: vec![None; round.projects.len()],
        applied: 0,
        ignored: 0,
    };

    for vote in votes {
        match index.get(vote.project_ref.as_str()) {
            Some(&i) => {
                partitioned.by_project[i]
                    .get_or_insert_with(Vec::new)
                    .push(vote.clone());
                partitioned.applied += 1;
            }
            None => {
                debug!(
                    "event=vote_ignored reason=unknown_project project_ref={} voter={}",
                    vote.project_ref, vote.voter
                );
                partitioned.ignored += 1;
            }
        }
    }

    partitioned
}

// ============================================================================
// Unit Tests
// ============================================================================
