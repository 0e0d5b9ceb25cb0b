//! JSON output for snapshots and comparisons.
//!
//! Serializes to JSON for scripting and piping.

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::snapshot::FollowerSnapshot;
use crate::store::diff::DayDiff;
use crate::store::StoreResponse;

fn day_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

pub fn render(account: &str, date: NaiveDate, snapshot: &FollowerSnapshot) -> String {
    let value = json!({
        "account": account,
        "date": day_stamp(date),
        "snapshot": snapshot,
    });
    format!("{value:#}")
}

pub fn render_days(days: &[NaiveDate]) -> String {
    let stamps: Vec<String> = days.iter().copied().map(day_stamp).collect();
    format!("{:#}", Value::from(stamps))
}

pub fn render_diff(diff: &DayDiff) -> String {
    let value = json!({
        "account": diff.account,
        "from": day_stamp(diff.from),
        "to": day_stamp(diff.to),
        "from_total": diff.from_total,
        "to_total": diff.to_total,
        "gained": diff.gained,
        "lost": diff.lost,
        "net_change": diff.net_change,
    });
    format!("{value:#}")
}

pub fn render_response(response: &StoreResponse) -> String {
    format!("{:#}", json!(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::diff::Delta;
    use std::path::PathBuf;

    #[test]
    fn snapshot_uses_day_stamp() {
        let snapshot = FollowerSnapshot::new(&["alice".to_string()], Delta::default());
        let text = render("me", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), &snapshot);
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["date"], "20240501");
        assert_eq!(value["snapshot"]["total_followers"], 1);
    }

    #[test]
    fn response_status_is_lowercase() {
        let text = render_response(&StoreResponse::failed(PathBuf::from("/data/followers_20240501.json")));
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["data_file"], "/data/followers_20240501.json");
    }
}
