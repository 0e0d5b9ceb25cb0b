//! Text rendering for snapshots and day comparisons.
//!
//! Formats output as a terminal table:
//! - Per-day follower counts with new and dropped names
//! - Day-to-day comparison with a net change summary

use chrono::NaiveDate;

use crate::snapshot::FollowerSnapshot;
use crate::store::diff::DayDiff;

pub fn render(account: &str, date: NaiveDate, snapshot: &FollowerSnapshot) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{account} on {}\n", date.format("%Y-%m-%d")));
    output.push_str(&"-".repeat(40));
    output.push('\n');
    output.push_str(&format!("  {:30} {:>8}\n", "followers", snapshot.total_followers));
    output.push_str(&format!("  {:30} {:>8}\n", "new", snapshot.total_new_followers));
    output.push_str(&format!("  {:30} {:>8}\n", "dropped", snapshot.total_dropped_followers));

    if !snapshot.has_changes() {
        output.push_str("\nNo changes since the previous day.\n");
        return output;
    }

    for name in &snapshot.new_followers {
        output.push_str(&format!("  [+] {name}\n"));
    }
    for name in &snapshot.dropped_followers {
        output.push_str(&format!("  [-] {name}\n"));
    }

    output
}

pub fn render_days(days: &[NaiveDate]) -> String {
    if days.is_empty() {
        return String::from("No snapshots found. Run 'follower-ledger track' to create one.\n");
    }

    let mut output = String::from("Snapshots:\n");
    for day in days {
        output.push_str(&format!("  {}\n", day.format("%Y-%m-%d")));
    }
    output
}

pub fn render_diff(diff: &DayDiff) -> String {
    let mut output = String::new();

    output.push_str(&format!("\nComparing followers of {}:\n", diff.account));
    output.push_str(&format!("  From: {} ({} followers)\n", diff.from.format("%Y-%m-%d"), diff.from_total));
    output.push_str(&format!("  To:   {} ({} followers)\n\n", diff.to.format("%Y-%m-%d"), diff.to_total));

    if diff.gained.is_empty() && diff.lost.is_empty() {
        output.push_str("No changes detected.\n");
        return output;
    }

    for name in &diff.gained {
        output.push_str(&format!("  [new] {name}\n"));
    }
    for name in &diff.lost {
        output.push_str(&format!("  [gone] {name}\n"));
    }

    if diff.net_change >= 0 {
        output.push_str(&format!("\nNet change: +{}\n", diff.net_change));
    } else {
        output.push_str(&format!("\nNet change: {}\n", diff.net_change));
    }

    output
}
