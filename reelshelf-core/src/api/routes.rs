macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions shared across ReelShelf services
pub mod v1 {
    pub const ROOT: &str = "/api/v1";

    pub const HEALTH: &str = v1_path!("/health");

    pub mod auth {
        pub const REGISTER: &str = v1_path!("/auth/register");
        pub const LOGIN: &str = v1_path!("/auth/login");
        pub const LOGOUT: &str = v1_path!("/auth/logout");
        pub const ME: &str = v1_path!("/auth/me");
        pub const UPDATE: &str = v1_path!("/auth/update");
        pub const CHANGE_PASSWORD: &str = v1_path!("/auth/change-password");
    }

    pub mod catalog {
        pub const SEARCH: &str = v1_path!("/catalog/search");
    }

    pub mod movies {
        pub const COLLECTION: &str = v1_path!("/movies");
        pub const FEATURED: &str = v1_path!("/movies/featured");
        pub const GENRES: &str = v1_path!("/movies/genres");
        pub const ITEM: &str = v1_path!("/movies/{id}");
        pub const PERSON: &str = v1_path!("/people/{id}");
    }

    pub mod books {
        pub const SEARCH: &str = v1_path!("/books/search");
        pub const GENRES: &str = v1_path!("/books/genres");
        pub const GOOGLE_ITEM: &str = v1_path!("/books/google/{id}");
        pub const OPEN_LIBRARY_ITEM: &str = v1_path!("/books/ol/{id}");
    }

    pub mod bookmarks {
        pub const COLLECTION: &str = v1_path!("/bookmarks");
        pub const CHECK: &str = v1_path!("/bookmarks/check/{type}/{id}");
        pub const ITEM: &str = v1_path!("/bookmarks/{type}/{id}");
        pub const PUBLIC: &str = v1_path!("/bookmarks/public/{user_id}");
    }

    pub mod comments {
        pub const COLLECTION: &str = v1_path!("/comments");
        pub const FOR_CONTENT: &str = v1_path!("/comments/{type}/{id}");
        pub const ITEM: &str = v1_path!("/comments/{id}");
    }

    pub mod friends {
        pub const REQUEST: &str = v1_path!("/friends/request");
        pub const ACCEPT: &str = v1_path!("/friends/accept");
        pub const REMOVE: &str = v1_path!("/friends/remove/{relation_id}");
        pub const LIST: &str = v1_path!("/friends/list");
        pub const RECEIVED: &str = v1_path!("/friends/requests/received");
        pub const SENT: &str = v1_path!("/friends/requests/sent");
        pub const STATUS: &str = v1_path!("/friends/status/{user_id}");
    }

    pub mod users {
        pub const SEARCH: &str = v1_path!("/users/search");
        pub const PUBLIC: &str = v1_path!("/users/public/{id}");
    }

    pub mod admin {
        pub const USERS: &str = v1_path!("/admin/users");
        pub const USER_ITEM: &str = v1_path!("/admin/users/{id}");
        pub const COMMENTS: &str = v1_path!("/admin/comments");
        pub const COMMENT_ITEM: &str = v1_path!("/admin/comments/{id}");
    }
}

/// Fill `{name}` placeholders of a route template, e.g. for clients and
/// tests building concrete URLs.
pub fn resolve(template: &str, params: &[(&str, &str)]) -> String {
    params
        .iter()
        .fold(template.to_string(), |path, (name, value)| {
            path.replace(&format!("{{{name}}}"), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_fills_every_placeholder() {
        assert_eq!(
            resolve(v1::bookmarks::ITEM, &[("type", "movie"), ("id", "603")]),
            "/api/v1/bookmarks/movie/603"
        );
        assert_eq!(
            resolve(v1::friends::REMOVE, &[("relation_id", "4")]),
            "/api/v1/friends/remove/4"
        );
    }

    #[test]
    fn all_routes_share_the_version_root() {
        for path in [v1::HEALTH, v1::auth::ME, v1::admin::COMMENT_ITEM] {
            assert!(path.starts_with(v1::ROOT));
        }
    }
}
