pub mod bookmarks;
pub mod comments;
pub mod friendships;
pub mod sessions;
pub mod users;
