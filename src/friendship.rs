//! Follow, unfollow and follow-status lookups.

use tracing::debug;

use crate::client::{ClientError, FriendshipStatuses, SocialClient, UserId};

pub fn follow_user<C: SocialClient + ?Sized>(client: &C, user_id: UserId) -> Result<bool, ClientError> {
    debug!(user_id, "following user");
    let response = client.friendships_create(user_id)?;
    if response.is_ok() {
        debug!(user_id, "followed user");
    }
    Ok(response.is_ok())
}

pub fn unfollow_user<C: SocialClient + ?Sized>(client: &C, user_id: UserId) -> Result<bool, ClientError> {
    debug!(user_id, "unfollowing user");
    let response = client.friendships_destroy(user_id)?;
    if response.is_ok() {
        debug!(user_id, "unfollowed user");
    }
    Ok(response.is_ok())
}

/// Friendship status for each id, keyed by id.
///
/// A single id uses the single-user lookup; several ids are fetched in one
/// batch call. No ids means no call.
pub fn follow_status<C: SocialClient + ?Sized>(
    client: &C,
    user_ids: &[UserId],
) -> Result<FriendshipStatuses, ClientError> {
    let statuses = match user_ids {
        [] => FriendshipStatuses::new(),
        [single] => {
            debug!(user_id = *single, "single id given");
            let status = client.friendships_show(*single)?;
            FriendshipStatuses::from([(*single, status)])
        }
        many => {
            debug!(count = many.len(), "multiple ids given");
            client.friendships_show_many(many)?
        }
    };

    Ok(statuses)
}
