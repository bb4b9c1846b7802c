use std::sync::Arc;

use argon2::Params;
use chrono::Duration;
use reelshelf_core::admin::AdminService;
use reelshelf_core::auth::{AuthCrypto, AuthService};
use reelshelf_core::catalog::MediaType;
use reelshelf_core::database::SqliteDatabase;
use reelshelf_core::error::CoreError;
use reelshelf_core::social::{
    BookmarkService, CommentService, FriendService, FriendshipStatus,
    NewBookmark, NewComment, RelationStatus,
};
use reelshelf_core::users::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest,
    UpdateProfileRequest, UserRole, UserService,
};
use tempfile::TempDir;

struct Harness {
    _dir: TempDir,
    db: SqliteDatabase,
    auth: AuthService,
}

async fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let db = SqliteDatabase::connect(&url).await.unwrap();
    db.migrate().await.unwrap();

    let crypto = AuthCrypto::with_params(
        "pepper",
        "token-key",
        Params::new(1024, 1, 1, Some(32)).unwrap(),
    )
    .unwrap();
    let auth = AuthService::new(
        db.users(),
        db.sessions(),
        Arc::new(crypto),
        Duration::hours(1),
    );

    Harness { _dir: dir, db, auth }
}

async fn register(h: &Harness, name: &str) -> AuthResponse {
    h.auth
        .register(&RegisterRequest {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            password: "correct horse".to_string(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn first_account_becomes_admin() {
    let h = harness().await;
    let first = register(&h, "alice").await;
    let second = register(&h, "bob").await;

    assert_eq!(first.user.role, UserRole::Admin);
    assert_eq!(second.user.role, UserRole::User);
    assert_eq!(first.token.len(), 43);
}

#[tokio::test]
async fn duplicate_usernames_conflict_case_insensitively() {
    let h = harness().await;
    register(&h, "alice").await;

    let err = h
        .auth
        .register(&RegisterRequest {
            name: "ALICE".into(),
            email: "other@example.com".into(),
            password: "correct horse".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn login_and_token_lifecycle() {
    let h = harness().await;
    let registered = register(&h, "carol").await;

    let bad = h
        .auth
        .login(&LoginRequest {
            username: "carol".into(),
            password: "wrong password".into(),
        })
        .await;
    assert!(matches!(bad, Err(CoreError::InvalidCredentials)));

    let login = h
        .auth
        .login(&LoginRequest {
            username: "Carol".into(),
            password: "correct horse".into(),
        })
        .await
        .unwrap();
    assert_ne!(login.token, registered.token);

    let current = h.auth.authenticate(&login.token).await.unwrap().unwrap();
    assert_eq!(current.user.username, "carol");

    h.auth
        .change_password(
            &current,
            &ChangePasswordRequest {
                current_password: "correct horse".into(),
                new_password: "battery staple".into(),
            },
        )
        .await
        .unwrap();

    // Other sessions are revoked, the current one survives.
    assert!(
        h.auth
            .authenticate(&registered.token)
            .await
            .unwrap()
            .is_none()
    );
    assert!(h.auth.authenticate(&login.token).await.unwrap().is_some());

    h.auth.logout(&current).await.unwrap();
    assert!(h.auth.authenticate(&login.token).await.unwrap().is_none());
    assert!(h.auth.authenticate("garbage").await.unwrap().is_none());
}

#[tokio::test]
async fn expired_sessions_are_rejected_and_purged() {
    let h = harness().await;
    let crypto = AuthCrypto::with_params(
        "pepper",
        "token-key",
        Params::new(1024, 1, 1, Some(32)).unwrap(),
    )
    .unwrap();
    let short_lived = AuthService::new(
        h.db.users(),
        h.db.sessions(),
        Arc::new(crypto),
        Duration::seconds(-1),
    );

    let response = short_lived
        .register(&RegisterRequest {
            name: "dave".into(),
            email: "dave@example.com".into(),
            password: "correct horse".into(),
        })
        .await
        .unwrap();

    assert!(
        short_lived
            .authenticate(&response.token)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(short_lived.purge_expired_sessions().await.unwrap(), 1);
}

#[tokio::test]
async fn profile_updates_and_avatar_clearing() {
    let h = harness().await;
    let erin = register(&h, "erin").await;
    register(&h, "frank").await;

    let updated = h
        .auth
        .update_profile(
            erin.user.id,
            &UpdateProfileRequest {
                username: None,
                avatar_url: Some("https://cdn.example.com/erin.png".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(
        updated.avatar_url.as_deref(),
        Some("https://cdn.example.com/erin.png")
    );

    let cleared = h
        .auth
        .update_profile(
            erin.user.id,
            &UpdateProfileRequest {
                username: None,
                avatar_url: Some(String::new()),
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.avatar_url, None);
    assert_eq!(cleared.username, "erin");

    let taken = h
        .auth
        .update_profile(
            erin.user.id,
            &UpdateProfileRequest {
                username: Some("frank".into()),
                avatar_url: None,
            },
        )
        .await;
    assert!(matches!(taken, Err(CoreError::Conflict(_))));
}

#[tokio::test]
async fn bookmarks_are_idempotent_and_scoped_by_type() {
    let h = harness().await;
    let user = register(&h, "gina").await.user;
    let bookmarks = BookmarkService::new(h.db.bookmarks(), h.db.users());

    let movie = NewBookmark {
        content_type: MediaType::Movie,
        content_id: "603".into(),
        title: "The Matrix".into(),
        poster_path: None,
    };
    let first = bookmarks.add(user.id, &movie).await.unwrap();
    let again = bookmarks.add(user.id, &movie).await.unwrap();
    assert_eq!(first.id, again.id);

    // Same id under another media type is a different item.
    let book = NewBookmark {
        content_type: MediaType::BookGoogle,
        content_id: "603".into(),
        title: String::new(),
        poster_path: None,
    };
    let untitled = bookmarks.add(user.id, &book).await.unwrap();
    assert_eq!(untitled.title, "Untitled");
    assert_eq!(bookmarks.list(user.id).await.unwrap().len(), 2);

    assert!(
        bookmarks
            .is_bookmarked(user.id, MediaType::Movie, "603")
            .await
            .unwrap()
    );
    bookmarks
        .remove(user.id, MediaType::Movie, "603")
        .await
        .unwrap();
    assert!(matches!(
        bookmarks.remove(user.id, MediaType::Movie, "603").await,
        Err(CoreError::NotFound(_))
    ));
    assert!(matches!(
        bookmarks.public_list(9_999).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn comment_moderation_rules() {
    let h = harness().await;
    let admin = register(&h, "admin").await.user;
    let author = register(&h, "author").await.user;
    let other = register(&h, "other").await.user;
    let comments = CommentService::new(h.db.comments());

    let new = NewComment {
        content_type: MediaType::BookOl,
        content_id: "OL45804W".into(),
        text: "  Loved it  ".into(),
    };
    let first = comments.create(&author, &new).await.unwrap();
    let second = comments.create(&other, &new).await.unwrap();
    assert_eq!(first.text, "Loved it");
    assert_eq!(first.username, "author");

    let listed = comments
        .list(MediaType::BookOl, "OL45804W")
        .await
        .unwrap();
    assert_eq!(listed[0].id, second.id, "newest first");

    let blank = NewComment {
        text: "   ".into(),
        ..new.clone()
    };
    assert!(comments.create(&author, &blank).await.is_err());

    assert!(matches!(
        comments.delete(&other, first.id).await,
        Err(CoreError::Forbidden(_))
    ));
    comments.delete(&admin, first.id).await.unwrap();
    comments.delete(&other, second.id).await.unwrap();
    assert!(matches!(
        comments.delete(&other, second.id).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn friendship_lifecycle() {
    let h = harness().await;
    let a = register(&h, "anna").await.user;
    let b = register(&h, "bert").await.user;
    let c = register(&h, "cleo").await.user;
    let friends = FriendService::new(h.db.friendships(), h.db.users());

    assert!(matches!(
        friends.request(a.id, a.id).await,
        Err(CoreError::InvalidRequest(_))
    ));
    assert!(matches!(
        friends.request(a.id, 9_999).await,
        Err(CoreError::NotFound(_))
    ));

    let pending = friends.request(a.id, b.id).await.unwrap();
    assert_eq!(pending.status, FriendshipStatus::Pending);
    assert!(matches!(
        friends.request(a.id, b.id).await,
        Err(CoreError::Conflict(_))
    ));
    assert_eq!(
        friends.status(b.id, a.id).await.unwrap().status,
        RelationStatus::RequestReceived
    );
    assert_eq!(friends.sent_requests(a.id).await.unwrap().len(), 1);
    assert_eq!(friends.received_requests(b.id).await.unwrap().len(), 1);

    // Only the addressee accepts; outsiders do not see the relation.
    assert!(matches!(
        friends.accept(a.id, pending.id).await,
        Err(CoreError::Forbidden(_))
    ));
    assert!(matches!(
        friends.accept(c.id, pending.id).await,
        Err(CoreError::NotFound(_))
    ));
    let accepted = friends.accept(b.id, pending.id).await.unwrap();
    assert_eq!(accepted.status, FriendshipStatus::Accepted);

    let list = friends.friends(a.id).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].user.username, "bert");
    assert_eq!(list[0].relation_id, pending.id);

    assert!(matches!(
        friends.request(b.id, a.id).await,
        Err(CoreError::Conflict(_))
    ));

    // A reverse pending request is accepted instead of duplicated.
    friends.request(c.id, a.id).await.unwrap();
    let mutual = friends.request(a.id, c.id).await.unwrap();
    assert_eq!(mutual.status, FriendshipStatus::Accepted);
    assert_eq!(friends.friends(a.id).await.unwrap().len(), 2);

    friends.remove(b.id, pending.id).await.unwrap();
    assert_eq!(
        friends.status(a.id, b.id).await.unwrap().status,
        RelationStatus::None
    );
}

#[tokio::test]
async fn deleting_a_user_cascades() {
    let h = harness().await;
    let admin = register(&h, "root").await;
    let victim = register(&h, "victim").await;

    let bookmarks = BookmarkService::new(h.db.bookmarks(), h.db.users());
    let comments = CommentService::new(h.db.comments());
    let friends = FriendService::new(h.db.friendships(), h.db.users());
    let admin_service = AdminService::new(h.db.users(), h.db.comments());

    bookmarks
        .add(
            victim.user.id,
            &NewBookmark {
                content_type: MediaType::Movie,
                content_id: "13".into(),
                title: "Forrest Gump".into(),
                poster_path: None,
            },
        )
        .await
        .unwrap();
    comments
        .create(
            &victim.user,
            &NewComment {
                content_type: MediaType::Movie,
                content_id: "13".into(),
                text: "Run!".into(),
            },
        )
        .await
        .unwrap();
    friends
        .request(victim.user.id, admin.user.id)
        .await
        .unwrap();

    assert!(matches!(
        admin_service.delete_user(&admin.user, admin.user.id).await,
        Err(CoreError::InvalidRequest(_))
    ));
    admin_service
        .delete_user(&admin.user, victim.user.id)
        .await
        .unwrap();

    assert!(h.auth.authenticate(&victim.token).await.unwrap().is_none());
    assert!(admin_service.comments().await.unwrap().is_empty());
    assert!(
        friends
            .received_requests(admin.user.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(admin_service.users().await.unwrap().len(), 1);
    assert!(matches!(
        admin_service.delete_user(&admin.user, victim.user.id).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn user_search_excludes_caller_and_escapes_wildcards() {
    let h = harness().await;
    let me = register(&h, "search_me").await.user;
    register(&h, "search_you").await;
    register(&h, "unrelated").await;
    let users = UserService::new(h.db.users());

    let found = users.search(me.id, "SEARCH").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username, "search_you");

    assert!(users.search(me.id, "%").await.unwrap().is_empty());
    assert!(users.search(me.id, "  ").await.unwrap().is_empty());
    assert!(matches!(
        users.public_profile(9_999).await,
        Err(CoreError::NotFound(_))
    ));
}
