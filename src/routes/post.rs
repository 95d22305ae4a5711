use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    HttpResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::present;
use crate::{
    app::{AppError, AppState},
    database::models::{
        post::{Post, PostDraft, PostRef, PostStatus},
        tag::TagInput,
    },
};

/// Number of posts returned by `/posts/latest`.
const LATEST_LIMIT: i64 = 5;

/// Body of the create and update routes. Everything is optional so a missing
/// field turns into a validation error instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<i32>,
    pub featured_image: Option<String>,
    pub tags: Option<TagInput>,
    pub categories: Option<Vec<i32>>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
}

impl PostPayload {
    /// Title, excerpt, content, author, featured image and at least one category are required.
    pub fn into_new_draft(self) -> Result<PostDraft, AppError> {
        let categories = self.categories.filter(|categories| !categories.is_empty());

        match (
            present(self.title),
            present(self.excerpt),
            present(self.content),
            self.author,
            present(self.featured_image),
            categories,
        ) {
            (Some(title), Some(_excerpt), Some(content), Some(author_id), Some(featured_image), Some(categories)) => {
                Ok(PostDraft {
                    title,
                    content,
                    author_id,
                    featured_image,
                    featured: self.featured.unwrap_or(false),
                    status: PostStatus::from_published(self.published.unwrap_or(false)),
                    categories,
                    tags: self.tags.map(|tags| tags.names()).unwrap_or_default(),
                })
            }
            _ => Err(AppError::validation("Missing required fields")),
        }
    }

    /// Updates only need the title, content, author and featured image.
    pub fn into_update_draft(self) -> Result<PostDraft, AppError> {
        match (
            present(self.title),
            present(self.content),
            self.author,
            present(self.featured_image),
        ) {
            (Some(title), Some(content), Some(author_id), Some(featured_image)) => Ok(PostDraft {
                title,
                content,
                author_id,
                featured_image,
                featured: self.featured.unwrap_or(false),
                status: PostStatus::from_published(self.published.unwrap_or(false)),
                categories: Vec::new(),
                tags: Vec::new(),
            }),
            _ => Err(AppError::validation("Missing required fields")),
        }
    }
}

/// Pipe for listing every post, drafts included
/// - url: `{domain}/posts`
#[get("/posts")]
pub async fn list_posts(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let posts = app_state.run(Post::all).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Pipe for publishing a new post
/// - url: `{domain}/posts`
///
/// # HTTP request requirements
/// ## body
/// - json with `title`, `excerpt`, `content`, `author`, `featuredImage` and a non-empty `categories` id list
/// - optional `tags` (list or comma separated string), `featured`, `published`
///
/// # Example
/// ```
/// let data = r#"{ "title": "Hello World", "excerpt": "Hi", "content": "...", "author": 1,
///     "featuredImage": "x.png", "categories": [1], "tags": "rust, web", "published": true }"#;
/// let request = actix_web::test::TestRequest::post()
///     .uri("localhost/posts")
///     .set_payload(data)
///     .to_request();
/// ```
///
/// # Response
/// ## Created
/// - json of the created post, its slug derived from the title
/// ## Error
/// - Bad request
/// - Conflict, when the slug is already taken
/// - Internal server error
#[post("/posts")]
pub async fn create_post(app_state: Data<AppState>, payload: Json<PostPayload>) -> Result<HttpResponse, AppError> {
    let draft = payload.into_inner().into_new_draft()?;

    let post = app_state.run(move |conn| Post::new(conn, &draft)).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Newest published featured post, `null` when there is none.
#[get("/posts/featured")]
pub async fn featured_post(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let post = app_state.run(Post::latest_featured).await?;
    Ok(HttpResponse::Ok().json(post))
}

#[get("/posts/latest")]
pub async fn latest_posts(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let posts = app_state.run(|conn| Post::latest(conn, LATEST_LIMIT)).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Slug-only lookup, reaches posts whose slug is all digits.
#[get("/posts/slug/{slug}")]
pub async fn get_post_by_slug(app_state: Data<AppState>, slug: Path<String>) -> Result<HttpResponse, AppError> {
    find_post(&app_state, PostRef::Slug(slug.into_inner())).await
}

/// Pipe for getting a post with its author
/// - url: `{domain}/posts/{id_or_slug}`
///
/// A numeric segment is always treated as an id.
///
/// # Response
/// ## Ok
/// ```
/// { "post": { "id": 1, "slug": "hello-world", ... }, "author": { "id": 3, "name": "Ada", ... } }
/// ```
/// ## Error
/// - Not found
#[get("/posts/{id_or_slug}")]
pub async fn get_post(app_state: Data<AppState>, id_or_slug: Path<String>) -> Result<HttpResponse, AppError> {
    find_post(&app_state, PostRef::parse(&id_or_slug)).await
}

async fn find_post(app_state: &AppState, post_ref: PostRef) -> Result<HttpResponse, AppError> {
    let lookup = post_ref.clone();
    let found = app_state
        .run(move |conn| Post::find_with_author(conn, &lookup))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Post with {} not found", post_ref)))?;

    Ok(HttpResponse::Ok().json(found))
}

/// Pipe for editing a post
/// - url: `{domain}/posts/{id_or_slug}`
///
/// # HTTP request requirements
/// ## body
/// - json with `title`, `content`, `author`, `featuredImage`; optional `featured`, `published`
///
/// # Response
/// ## Ok
/// - json of the updated post, slug recomputed, excerpt untouched
/// ## Error
/// - Bad request
/// - Not found
#[put("/posts/{id_or_slug}")]
pub async fn update_post(
    app_state: Data<AppState>,
    id_or_slug: Path<String>,
    payload: Json<PostPayload>,
) -> Result<HttpResponse, AppError> {
    let draft = payload.into_inner().into_update_draft()?;
    let post_ref = PostRef::parse(&id_or_slug);

    let lookup = post_ref.clone();
    let post = app_state
        .run(move |conn| Post::update(conn, &lookup, &draft))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Post with {} not found", post_ref)))?;

    Ok(HttpResponse::Ok().json(post))
}

/// Deletes a post together with its comments, likes, bookmarks and links.
#[delete("/posts/{id_or_slug}")]
pub async fn delete_post(app_state: Data<AppState>, id_or_slug: Path<String>) -> Result<HttpResponse, AppError> {
    let post_ref = PostRef::parse(&id_or_slug);

    let lookup = post_ref.clone();
    if !app_state.run(move |conn| Post::delete(conn, &lookup)).await? {
        return Err(AppError::not_found(format!("Post with {} not found", post_ref)));
    }

    log::info!("post with {} deleted", post_ref);
    Ok(HttpResponse::Ok().json(json!({ "message": "Post deleted successfully" })))
}
