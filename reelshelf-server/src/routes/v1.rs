use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use reelshelf_core::api::routes::v1;

use crate::{
    AppState,
    handlers::{
        admin, auth, bookmarks, catalog, comments, friends, health, users,
    },
    middleware::{require_admin, require_auth},
};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(v1::HEALTH, get(health::health_handler))
        // Catalog
        .route(v1::catalog::SEARCH, get(catalog::search_handler))
        .route(v1::movies::COLLECTION, get(catalog::movies_handler))
        .route(v1::movies::FEATURED, get(catalog::featured_handler))
        .route(v1::movies::GENRES, get(catalog::movie_genres_handler))
        .route(v1::movies::ITEM, get(catalog::movie_detail_handler))
        .route(v1::movies::PERSON, get(catalog::person_detail_handler))
        .route(v1::books::SEARCH, get(catalog::books_handler))
        .route(v1::books::GENRES, get(catalog::book_genres_handler))
        .route(
            v1::books::GOOGLE_ITEM,
            get(catalog::google_book_detail_handler),
        )
        .route(
            v1::books::OPEN_LIBRARY_ITEM,
            get(catalog::open_library_detail_handler),
        )
        // Public authentication endpoints
        .route(v1::auth::REGISTER, post(auth::register_handler))
        .route(v1::auth::LOGIN, post(auth::login_handler))
        // Public social reads
        .route(
            v1::bookmarks::PUBLIC,
            get(bookmarks::public_bookmarks_handler),
        )
        .route(
            v1::comments::FOR_CONTENT,
            get(comments::list_comments_handler),
        )
        .route(v1::users::PUBLIC, get(users::public_profile_handler))
        .merge(create_protected_routes(state.clone()))
        .merge(create_admin_routes(state))
}

/// Create protected routes that require authentication
fn create_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(v1::auth::ME, get(auth::me_handler))
        .route(v1::auth::UPDATE, put(auth::update_profile_handler))
        .route(
            v1::auth::CHANGE_PASSWORD,
            put(auth::change_password_handler),
        )
        .route(v1::auth::LOGOUT, post(auth::logout_handler))
        // Bookmarks
        .route(
            v1::bookmarks::COLLECTION,
            get(bookmarks::list_bookmarks_handler)
                .post(bookmarks::add_bookmark_handler),
        )
        .route(v1::bookmarks::CHECK, get(bookmarks::check_bookmark_handler))
        .route(
            v1::bookmarks::ITEM,
            delete(bookmarks::remove_bookmark_handler),
        )
        // Comments
        .route(
            v1::comments::COLLECTION,
            post(comments::create_comment_handler),
        )
        .route(v1::comments::ITEM, delete(comments::delete_comment_handler))
        // Friends
        .route(v1::friends::REQUEST, post(friends::send_request_handler))
        .route(v1::friends::ACCEPT, post(friends::accept_request_handler))
        .route(v1::friends::REMOVE, delete(friends::remove_relation_handler))
        .route(v1::friends::LIST, get(friends::list_friends_handler))
        .route(
            v1::friends::RECEIVED,
            get(friends::received_requests_handler),
        )
        .route(v1::friends::SENT, get(friends::sent_requests_handler))
        .route(v1::friends::STATUS, get(friends::relation_status_handler))
        // Users
        .route(v1::users::SEARCH, get(users::search_users_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

/// Admin routes. The admin check is the inner layer so it sees the user
/// inserted by `require_auth`.
fn create_admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(v1::admin::USERS, get(admin::list_users_handler))
        .route(v1::admin::USER_ITEM, delete(admin::delete_user_handler))
        .route(v1::admin::COMMENTS, get(admin::list_comments_handler))
        .route(
            v1::admin::COMMENT_ITEM,
            delete(admin::delete_comment_handler),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
