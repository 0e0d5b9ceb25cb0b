//! Paginated follower collection.

use tracing::debug;

use crate::client::{ClientError, SocialClient, UserId, UserSummary};

/// Every follower username of `user_id`, sorted, without duplicates.
pub fn fetch_followers<C: SocialClient + ?Sized>(
    client: &C,
    user_id: UserId,
    rank_token: &str,
) -> Result<Vec<String>, ClientError> {
    debug!(user_id, "collecting followers");

    let mut users: Vec<UserSummary> = Vec::new();
    let mut max_id: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = client.user_followers(user_id, rank_token, max_id.as_deref())?;
        pages += 1;
        users.extend(page.users);

        match page.next_max_id.filter(|id| !id.is_empty()) {
            Some(next) => max_id = Some(next),
            None => break,
        }
    }

    let mut followers: Vec<String> = users.into_iter().map(|u| u.username).collect();
    followers.sort_unstable();
    followers.dedup();

    debug!(user_id, pages, total = followers.len(), "collected all followers");
    Ok(followers)
}

/// Parse an exported follower list.
///
/// Accepts a JSON array of usernames, or plain text with one username per
/// line. Blank lines are skipped.
pub fn parse_follower_list(content: &str) -> Result<Vec<String>, serde_json::Error> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed);
    }

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_array() {
        let list = parse_follower_list(r#" ["carol", "alice"] "#).unwrap();
        assert_eq!(list, vec!["carol".to_string(), "alice".to_string()]);
    }

    #[test]
    fn parses_lines() {
        let list = parse_follower_list("alice\n\n  bob \r\ncarol\n").unwrap();
        assert_eq!(list, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn empty_input_is_empty_list() {
        assert!(parse_follower_list("").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_string_array() {
        assert!(parse_follower_list("[1, 2]").is_err());
    }
}
