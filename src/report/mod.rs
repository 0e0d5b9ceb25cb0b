pub mod json;
pub mod table;

use chrono::NaiveDate;

use crate::snapshot::FollowerSnapshot;
use crate::store::diff::DayDiff;

pub fn print_snapshot(account: &str, date: NaiveDate, snapshot: &FollowerSnapshot, as_json: bool) {
    if as_json {
        println!("{}", json::render(account, date, snapshot));
    } else {
        print!("{}", table::render(account, date, snapshot));
    }
}

pub fn print_days(days: &[NaiveDate], as_json: bool) {
    if as_json {
        println!("{}", json::render_days(days));
    } else {
        print!("{}", table::render_days(days));
    }
}

pub fn print_diff(diff: &DayDiff, as_json: bool) {
    if as_json {
        println!("{}", json::render_diff(diff));
    } else {
        print!("{}", table::render_diff(diff));
    }
}
