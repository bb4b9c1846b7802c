use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::catalog::MediaType;
use crate::users::PublicProfile;

pub const MAX_COMMENT_LEN: usize = 2000;
pub const MAX_BOOKMARK_TITLE_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Bookmark {
    pub id: i64,
    pub user_id: i64,
    pub content_type: MediaType,
    pub content_id: String,
    pub title: String,
    pub poster_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBookmark {
    pub content_type: MediaType,
    pub content_id: String,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// A comment joined with its author's public fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub avatar_url: Option<String>,
    pub content_type: MediaType,
    pub content_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub content_type: MediaType,
    pub content_id: String,
    pub text: String,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Friendship {
    pub id: i64,
    pub requester_id: i64,
    pub addressee_id: i64,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    pub fn involves(&self, user_id: i64) -> bool {
        self.requester_id == user_id || self.addressee_id == user_id
    }

    /// The other side of the relation, seen from `user_id`.
    pub fn other(&self, user_id: i64) -> i64 {
        if self.requester_id == user_id {
            self.addressee_id
        } else {
            self.requester_id
        }
    }
}

/// A friend or request listing entry: the other user plus the relation id
/// needed to accept or remove it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FriendEntry {
    pub relation_id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub user: PublicProfile,
    pub since: DateTime<Utc>,
}

/// Relation between the caller and another user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationStatus {
    #[serde(rename = "self")]
    Myself,
    None,
    Friends,
    RequestSent,
    RequestReceived,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationView {
    pub status: RelationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_id: Option<i64>,
}

impl RelationView {
    pub fn between(viewer: i64, other: i64, row: Option<&Friendship>) -> Self {
        if viewer == other {
            return Self {
                status: RelationStatus::Myself,
                relation_id: None,
            };
        }

        let Some(row) = row else {
            return Self {
                status: RelationStatus::None,
                relation_id: None,
            };
        };

        let status = match row.status {
            FriendshipStatus::Accepted => RelationStatus::Friends,
            FriendshipStatus::Pending if row.requester_id == viewer => {
                RelationStatus::RequestSent
            }
            FriendshipStatus::Pending => RelationStatus::RequestReceived,
        };

        Self {
            status,
            relation_id: Some(row.id),
        }
    }
}
