//! Follower snapshot records.
//!
//! One `FollowerSnapshot` per account per day. A day's file holds a
//! `SnapshotFile`, keyed by account name.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::store::diff::Delta;

/// Followers of one account on one day, plus the change since the previous day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerSnapshot {
    pub followers: Vec<String>,
    pub total_followers: usize,
    pub new_followers: Vec<String>,
    pub dropped_followers: Vec<String>,
    pub total_new_followers: usize,
    pub total_dropped_followers: usize,
}

/// A stored record whose fields disagree with each other.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InconsistentSnapshot {
    #[error("{field} is {recorded} but {listed} entries are listed")]
    CountMismatch {
        field: &'static str,
        recorded: usize,
        listed: usize,
    },
    #[error("{0} is listed as both new and dropped")]
    NewAndDropped(String),
}

/// Contents of one day's snapshot file.
pub type SnapshotFile = BTreeMap<String, FollowerSnapshot>;

impl FollowerSnapshot {
    /// Build a snapshot from today's follower list and the computed delta.
    ///
    /// The follower list is sorted and deduplicated; the totals are derived
    /// from the sequences so they can never disagree.
    pub fn new(followers: &[String], delta: Delta) -> Self {
        let followers = normalize(followers);

        FollowerSnapshot {
            total_followers: followers.len(),
            total_new_followers: delta.new_followers.len(),
            total_dropped_followers: delta.dropped_followers.len(),
            followers,
            new_followers: delta.new_followers,
            dropped_followers: delta.dropped_followers,
        }
    }

    /// Checks the count invariants of a record read back from disk.
    pub fn validate(&self) -> Result<(), InconsistentSnapshot> {
        let counts = [
            ("total_followers", self.total_followers, self.followers.len()),
            ("total_new_followers", self.total_new_followers, self.new_followers.len()),
            (
                "total_dropped_followers",
                self.total_dropped_followers,
                self.dropped_followers.len(),
            ),
        ];
        for (field, recorded, listed) in counts {
            if recorded != listed {
                return Err(InconsistentSnapshot::CountMismatch {
                    field,
                    recorded,
                    listed,
                });
            }
        }

        let new: BTreeSet<&str> = self.new_followers.iter().map(String::as_str).collect();
        if let Some(both) = self.dropped_followers.iter().find(|u| new.contains(u.as_str())) {
            return Err(InconsistentSnapshot::NewAndDropped(both.clone()));
        }

        Ok(())
    }

    pub fn has_changes(&self) -> bool {
        self.total_new_followers > 0 || self.total_dropped_followers > 0
    }
}

/// Sorted, duplicate-free copy of a follower list.
pub fn normalize(followers: &[String]) -> Vec<String> {
    followers
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_sorts_and_dedups_followers() {
        let snapshot = FollowerSnapshot::new(&names(&["carol", "alice", "carol"]), Delta::default());
        assert_eq!(snapshot.followers, names(&["alice", "carol"]));
        assert_eq!(snapshot.total_followers, 2);
        assert!(!snapshot.has_changes());
    }

    #[test]
    fn totals_follow_delta() {
        let delta = Delta {
            new_followers: names(&["dave"]),
            dropped_followers: names(&["bob", "erin"]),
        };
        let snapshot = FollowerSnapshot::new(&names(&["alice", "dave"]), delta);
        assert_eq!(snapshot.total_new_followers, 1);
        assert_eq!(snapshot.total_dropped_followers, 2);
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn validate_rejects_count_mismatch() {
        let mut snapshot = FollowerSnapshot::new(&names(&["alice"]), Delta::default());
        snapshot.total_followers = 5;
        assert_eq!(
            snapshot.validate(),
            Err(InconsistentSnapshot::CountMismatch {
                field: "total_followers",
                recorded: 5,
                listed: 1,
            })
        );
    }

    #[test]
    fn validate_rejects_overlapping_delta() {
        let mut snapshot = FollowerSnapshot::new(&names(&["alice"]), Delta::default());
        snapshot.new_followers = names(&["bob"]);
        snapshot.dropped_followers = names(&["bob"]);
        snapshot.total_new_followers = 1;
        snapshot.total_dropped_followers = 1;
        assert_eq!(
            snapshot.validate(),
            Err(InconsistentSnapshot::NewAndDropped("bob".to_string()))
        );
    }

    #[test]
    fn serializes_with_file_field_names() {
        let snapshot = FollowerSnapshot::new(&names(&["alice"]), Delta::default());
        let value = serde_json::to_value(&snapshot).unwrap();
        for key in [
            "followers",
            "total_followers",
            "new_followers",
            "dropped_followers",
            "total_new_followers",
            "total_dropped_followers",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
