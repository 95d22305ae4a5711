use std::fmt::Display;

use chrono::{NaiveDateTime, Utc};
use diesel::{pg::Pg, prelude::*, PgConnection};
use serde::Serialize;

use super::{tag::Tag, user::AuthorProfile};
use crate::{
    app::AppError,
    schema::{post_categories, post_tags, posts, users},
};

pub const SLUG_MAX_LEN: usize = 50;
pub const EXCERPT_LEN: usize = 150;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = posts)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    #[serde(rename = "author")]
    pub author_id: i32,
    pub featured_image: Option<String>,
    pub featured: bool,
    pub status: String,
    pub likes: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = posts)]
struct PostInsert<'a> {
    title: &'a str,
    slug: String,
    excerpt: String,
    content: &'a str,
    author_id: i32,
    featured_image: &'a str,
    featured: bool,
    status: &'static str,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = posts)]
struct PostChangeset<'a> {
    title: &'a str,
    slug: String,
    content: &'a str,
    author_id: i32,
    featured_image: &'a str,
    featured: bool,
    status: &'static str,
    updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = post_categories)]
struct PostCategoryLink {
    post_id: i32,
    category_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = post_tags)]
struct PostTagLink {
    post_id: i32,
    tag_id: i32,
}

/// Visibility of a post. Only published posts show up in public listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn from_published(published: bool) -> PostStatus {
        if published {
            PostStatus::Published
        } else {
            PostStatus::Draft
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a route addresses a post. A segment that parses as an integer is always an id,
/// even if some post has an all-digit slug; those are reachable through the slug-only route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostRef {
    Id(i32),
    Slug(String),
}

impl PostRef {
    pub fn parse(segment: &str) -> PostRef {
        match segment.trim().parse::<i32>() {
            Ok(id) => PostRef::Id(id),
            Err(_) => PostRef::Slug(segment.to_string()),
        }
    }
}

impl Display for PostRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostRef::Id(id) => write!(f, "id {}", id),
            PostRef::Slug(slug) => write!(f, "slug '{}'", slug),
        }
    }
}

/// A validated post, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub author_id: i32,
    pub featured_image: String,
    pub featured: bool,
    pub status: PostStatus,
    /// Only used on creation.
    pub categories: Vec<i32>,
    /// Normalized tag names, only used on creation.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: Option<AuthorProfile>,
}

/// Lowercases the title, collapses every whitespace run into a single `-`
/// and keeps at most [`SLUG_MAX_LEN`] characters.
///
/// # Example
/// ```
/// assert_eq!(slugify("Hello   World"), "hello-world");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_whitespace = false;

    for c in title.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }

    slug.chars().take(SLUG_MAX_LEN).collect()
}

/// First [`EXCERPT_LEN`] characters of the content.
pub fn excerpt_of(content: &str) -> String {
    content.chars().take(EXCERPT_LEN).collect()
}

type AuthorColumns = (
    users::id,
    users::name,
    users::email,
    users::profile_picture,
    users::bio,
    users::github,
    users::twitter,
    users::linkedin,
    users::website,
    users::created_at,
);

const AUTHOR_COLUMNS: AuthorColumns = (
    users::id,
    users::name,
    users::email,
    users::profile_picture,
    users::bio,
    users::github,
    users::twitter,
    users::linkedin,
    users::website,
    users::created_at,
);

impl Post {
    /// Creates the post together with its category and tag links.
    /// Everything happens in one transaction, a failure leaves no partial post behind.
    pub fn new(conn: &mut PgConnection, draft: &PostDraft) -> Result<Post, AppError> {
        if draft.categories.is_empty() {
            return Err(AppError::validation("At least one category is required"));
        }

        conn.transaction(|conn| {
            let time = Utc::now().naive_utc();
            let to_insert = PostInsert {
                title: &draft.title,
                slug: slugify(&draft.title),
                excerpt: excerpt_of(&draft.content),
                content: &draft.content,
                author_id: draft.author_id,
                featured_image: &draft.featured_image,
                featured: draft.featured,
                status: draft.status.as_str(),
                created_at: time,
                updated_at: time,
            };

            let post = diesel::insert_into(posts::table)
                .values(&to_insert)
                .returning(Post::as_returning())
                .get_result(conn)?;

            let category_links = draft
                .categories
                .iter()
                .map(|category_id| PostCategoryLink {
                    post_id: post.id,
                    category_id: *category_id,
                })
                .collect::<Vec<_>>();
            diesel::insert_into(post_categories::table)
                .values(&category_links)
                .execute(conn)?;

            for tag_name in &draft.tags {
                let tag = Tag::find_or_create(conn, tag_name)?;
                diesel::insert_into(post_tags::table)
                    .values(&PostTagLink {
                        post_id: post.id,
                        tag_id: tag.id,
                    })
                    .on_conflict_do_nothing()
                    .execute(conn)?;
            }

            log::info!(
                "post {} '{}' created by user {} with {} categories and {} tags",
                post.id,
                post.slug,
                post.author_id,
                category_links.len(),
                draft.tags.len()
            );
            Ok(post)
        })
    }

    pub fn all(conn: &mut PgConnection) -> Result<Vec<Post>, AppError> {
        Ok(posts::table
            .order(posts::id.asc())
            .select(Post::as_select())
            .load(conn)?)
    }

    /// Published posts, newest first.
    pub fn latest(conn: &mut PgConnection, limit: i64) -> Result<Vec<Post>, AppError> {
        Ok(posts::table
            .filter(posts::status.eq(PostStatus::Published.as_str()))
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(limit)
            .select(Post::as_select())
            .load(conn)?)
    }

    /// Newest published post flagged as featured.
    pub fn latest_featured(conn: &mut PgConnection) -> Result<Option<Post>, AppError> {
        Ok(posts::table
            .filter(posts::status.eq(PostStatus::Published.as_str()))
            .filter(posts::featured.eq(true))
            .order((posts::created_at.desc(), posts::id.desc()))
            .select(Post::as_select())
            .first(conn)
            .optional()?)
    }

    pub fn get_by_id(conn: &mut PgConnection, post_id: i32) -> Result<Option<Post>, AppError> {
        Ok(posts::table
            .find(post_id)
            .select(Post::as_select())
            .first(conn)
            .optional()?)
    }

    /// Returns the post with the fixed author projection, left joined.
    pub fn find_with_author(conn: &mut PgConnection, post_ref: &PostRef) -> Result<Option<PostWithAuthor>, AppError> {
        let query = posts::table
            .left_join(users::table)
            .select((Post::as_select(), AUTHOR_COLUMNS.nullable()))
            .into_boxed::<Pg>();

        let query = match post_ref {
            PostRef::Id(post_id) => query.filter(posts::id.eq(*post_id)),
            PostRef::Slug(slug) => query.filter(posts::slug.eq(slug.clone())),
        };

        let found = query
            .first::<(Post, Option<AuthorProfile>)>(conn)
            .optional()?;

        Ok(found.map(|(post, author)| PostWithAuthor { post, author }))
    }

    fn resolve_id(conn: &mut PgConnection, post_ref: &PostRef) -> Result<Option<i32>, AppError> {
        match post_ref {
            PostRef::Id(post_id) => Ok(Some(*post_id)),
            PostRef::Slug(slug) => Ok(posts::table
                .filter(posts::slug.eq(slug))
                .select(posts::id)
                .first::<i32>(conn)
                .optional()?),
        }
    }

    /// Rewrites the editable fields and recomputes the slug. The excerpt is kept as is.
    pub fn update(conn: &mut PgConnection, post_ref: &PostRef, draft: &PostDraft) -> Result<Option<Post>, AppError> {
        let post_id = match Post::resolve_id(conn, post_ref)? {
            Some(post_id) => post_id,
            None => return Ok(None),
        };

        let changes = PostChangeset {
            title: &draft.title,
            slug: slugify(&draft.title),
            content: &draft.content,
            author_id: draft.author_id,
            featured_image: &draft.featured_image,
            featured: draft.featured,
            status: draft.status.as_str(),
            updated_at: Utc::now().naive_utc(),
        };

        Ok(diesel::update(posts::table.find(post_id))
            .set(&changes)
            .returning(Post::as_returning())
            .get_result(conn)
            .optional()?)
    }

    /// Deletes the post; comments, likes, bookmarks and links cascade in the store.
    pub fn delete(conn: &mut PgConnection, post_ref: &PostRef) -> Result<bool, AppError> {
        let post_id = match Post::resolve_id(conn, post_ref)? {
            Some(post_id) => post_id,
            None => return Ok(false),
        };

        let affected = diesel::delete(posts::table.find(post_id)).execute(conn)?;
        Ok(affected > 0)
    }

    pub fn increment_likes(conn: &mut PgConnection, post_id: i32) -> Result<(), AppError> {
        diesel::update(posts::table.find(post_id))
            .set(posts::likes.eq(posts::likes + 1))
            .execute(conn)?;
        Ok(())
    }
}
