//! Repository traits the services depend on.

pub mod bookmarks;
pub mod comments;
pub mod friendships;
pub mod sessions;
pub mod users;

pub use bookmarks::BookmarksRepository;
pub use comments::CommentsRepository;
pub use friendships::FriendshipsRepository;
pub use sessions::{Session, SessionsRepository};
pub use users::UsersRepository;
