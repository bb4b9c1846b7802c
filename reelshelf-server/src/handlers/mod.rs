//! HTTP request handlers organized by functionality

pub mod admin;
pub mod auth;
pub mod bookmarks;
pub mod catalog;
pub mod comments;
pub mod friends;
pub mod health;
pub mod users;
