//! Follower comparison engine.
//!
//! Compares two follower lists and reports changes:
//! - New followers (present now, absent before)
//! - Dropped followers (present before, absent now)
//! - Day-to-day comparison of two stored snapshots

use chrono::NaiveDate;
use std::collections::HashSet;
use thiserror::Error;

use super::{SnapshotStore, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub new_followers: Vec<String>,
    pub dropped_followers: Vec<String>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.new_followers.is_empty() && self.dropped_followers.is_empty()
    }
}

/// Compare today's follower list with the previous one.
///
/// Without a previous list there is nothing to compare against and both
/// sides are empty. New followers keep the order of `today`, dropped
/// followers the order of `previous`; duplicates are reported once.
pub fn compute_delta(today: &[String], previous: Option<&[String]>) -> Delta {
    let Some(previous) = previous else {
        return Delta::default();
    };

    Delta {
        new_followers: missing_from(today, previous),
        dropped_followers: missing_from(previous, today),
    }
}

/// Items of `from` that do not appear in `other`, in `from` order.
fn missing_from(from: &[String], other: &[String]) -> Vec<String> {
    let other: HashSet<&str> = other.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    from.iter()
        .filter(|name| !other.contains(name.as_str()) && seen.insert(name.as_str()))
        .cloned()
        .collect()
}

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("no snapshot for {account} on {}", .date.format("%Y-%m-%d"))]
    MissingDay { account: String, date: NaiveDate },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug)]
pub struct DayDiff {
    pub account: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub from_total: usize,
    pub to_total: usize,
    pub gained: Vec<String>,
    pub lost: Vec<String>,
    pub net_change: i64,
}

/// Compare the stored follower lists of `account` on two days.
pub fn compare_days(
    store: &SnapshotStore,
    account: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<DayDiff, DiffError> {
    let load = |date: NaiveDate| -> Result<_, DiffError> {
        store
            .load_previous(account, date)?
            .ok_or_else(|| DiffError::MissingDay {
                account: account.to_string(),
                date,
            })
    };

    let older = load(from)?;
    let newer = load(to)?;

    let delta = compute_delta(&newer.followers, Some(older.followers.as_slice()));
    let to_total = i64::try_from(newer.total_followers).unwrap_or(i64::MAX);
    let from_total = i64::try_from(older.total_followers).unwrap_or(i64::MAX);

    Ok(DayDiff {
        account: account.to_string(),
        from,
        to,
        from_total: older.total_followers,
        to_total: newer.total_followers,
        gained: delta.new_followers,
        lost: delta.dropped_followers,
        net_change: to_total.saturating_sub(from_total),
    })
}
