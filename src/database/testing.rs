//! Fixtures for store-backed tests. Every row gets a random suffix so tests can share one database.

use diesel::PgConnection;

use crate::{
    auth::token::Token,
    database::models::{
        category::Category,
        post::{Post, PostDraft, PostStatus},
        user::{NewUser, User},
    },
};

pub fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, Token::generate().to_lowercase())
}

pub fn user(conn: &mut PgConnection) -> User {
    let handle = Token::generate().to_lowercase();
    User::new(
        conn,
        &NewUser {
            name: format!("Test user {}", handle),
            email: format!("{}@example.com", handle),
            password: String::from("$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA"),
            profile_picture: None,
        },
    )
    .unwrap()
}

/// Id of some category, seeding the defaults when needed.
pub fn category(conn: &mut PgConnection) -> i32 {
    Category::all_seeded(conn).unwrap()[0].id
}

pub fn draft(author_id: i32, category_id: i32, published: bool) -> PostDraft {
    PostDraft {
        title: unique("Test post"),
        content: String::from("Test content"),
        author_id,
        featured_image: String::from("x.png"),
        featured: false,
        status: PostStatus::from_published(published),
        categories: vec![category_id],
        tags: Vec::new(),
    }
}

pub fn post(conn: &mut PgConnection, author_id: i32, published: bool) -> Post {
    let category_id = category(conn);
    Post::new(conn, &draft(author_id, category_id, published)).unwrap()
}
