use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::database::ports::{FriendshipsRepository, UsersRepository};
use crate::error::{CoreError, Result};

use super::model::{FriendEntry, Friendship, FriendshipStatus, RelationView};

/// Friend requests and the accepted-friends graph.
///
/// At most one relation exists per pair of users. A request towards someone
/// who already asked you accepts their request instead of opening a second
/// one.
#[derive(Clone)]
pub struct FriendService {
    friendships: Arc<dyn FriendshipsRepository>,
    users: Arc<dyn UsersRepository>,
}

impl fmt::Debug for FriendService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FriendService").finish_non_exhaustive()
    }
}

impl FriendService {
    pub fn new(
        friendships: Arc<dyn FriendshipsRepository>,
        users: Arc<dyn UsersRepository>,
    ) -> Self {
        Self { friendships, users }
    }

    pub async fn request(
        &self,
        requester_id: i64,
        receiver_id: i64,
    ) -> Result<Friendship> {
        if requester_id == receiver_id {
            return Err(CoreError::InvalidRequest(
                "cannot send a friend request to yourself".to_string(),
            ));
        }
        if self.users.get_user_by_id(receiver_id).await?.is_none() {
            return Err(CoreError::NotFound(format!("user {receiver_id}")));
        }

        match self
            .friendships
            .find_between(requester_id, receiver_id)
            .await?
        {
            Some(existing) if existing.status == FriendshipStatus::Accepted => {
                Err(CoreError::Conflict("Already friends".to_string()))
            }
            Some(existing) if existing.requester_id == requester_id => Err(
                CoreError::Conflict("Friend request already sent".to_string()),
            ),
            Some(reverse) => {
                info!(
                    relation_id = reverse.id,
                    "mutual friend request, accepting"
                );
                self.friendships.accept(reverse.id).await
            }
            None => {
                self.friendships
                    .create_request(requester_id, receiver_id)
                    .await
            }
        }
    }

    /// Only the addressee of a pending request may accept it.
    pub async fn accept(
        &self,
        user_id: i64,
        relation_id: i64,
    ) -> Result<Friendship> {
        let relation = self.involving(user_id, relation_id).await?;

        if relation.status == FriendshipStatus::Accepted {
            return Err(CoreError::Conflict("Already friends".to_string()));
        }
        if relation.addressee_id != user_id {
            return Err(CoreError::Forbidden(
                "only the recipient can accept a friend request".to_string(),
            ));
        }

        self.friendships.accept(relation_id).await
    }

    /// Cancel, decline or unfriend. Either party may remove the relation.
    pub async fn remove(&self, user_id: i64, relation_id: i64) -> Result<()> {
        self.involving(user_id, relation_id).await?;
        self.friendships.delete(relation_id).await?;
        Ok(())
    }

    pub async fn friends(&self, user_id: i64) -> Result<Vec<FriendEntry>> {
        self.friendships.list_friends(user_id).await
    }

    pub async fn received_requests(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendEntry>> {
        self.friendships.list_received(user_id).await
    }

    pub async fn sent_requests(
        &self,
        user_id: i64,
    ) -> Result<Vec<FriendEntry>> {
        self.friendships.list_sent(user_id).await
    }

    pub async fn status(
        &self,
        viewer_id: i64,
        other_id: i64,
    ) -> Result<RelationView> {
        if viewer_id == other_id {
            return Ok(RelationView::between(viewer_id, other_id, None));
        }
        let row = self.friendships.find_between(viewer_id, other_id).await?;
        Ok(RelationView::between(viewer_id, other_id, row.as_ref()))
    }

    /// Relations the user is not part of are reported as missing.
    async fn involving(
        &self,
        user_id: i64,
        relation_id: i64,
    ) -> Result<Friendship> {
        self.friendships
            .get(relation_id)
            .await?
            .filter(|relation| relation.involves(user_id))
            .ok_or_else(|| {
                CoreError::NotFound(format!("friend relation {relation_id}"))
            })
    }
}
