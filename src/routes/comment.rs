use actix_web::{
    delete, get, post,
    web::{Data, Json, Path},
    HttpResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::present;
use crate::{
    app::{AppError, AppState},
    database::models::comment::Comment,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    pub user_id: Option<i32>,
    pub post_id: Option<i32>,
    pub content: Option<String>,
}

/// Pipe for commenting on a post
/// - url: `{domain}/comments`
///
/// # HTTP request requirements
/// ## body
/// - json with `userId`, `postId` and a non-blank `content`
///
/// # Example
/// ```
/// let data = r#"{ "userId": 3, "postId": 12, "content": "Nice read" }"#;
/// let request = actix_web::test::TestRequest::post()
///     .uri("localhost/comments")
///     .set_payload(data)
///     .to_request();
/// ```
///
/// # Response
/// ## Created
/// - json of the new [comment](Comment)
/// ## Error
/// - Bad request, also when the post or user does not exist
#[post("/comments")]
pub async fn create_comment(app_state: Data<AppState>, payload: Json<CommentPayload>) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let (user_id, post_id, content) = match (payload.user_id, payload.post_id, present(payload.content)) {
        (Some(user_id), Some(post_id), Some(content)) => (user_id, post_id, content),
        _ => return Err(AppError::validation("Missing required fields")),
    };

    let comment = app_state
        .run(move |conn| Comment::new(conn, post_id, user_id, &content))
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Pipe for getting the comments of a post, newest first
/// - url: `{domain}/posts/{post_id}/comments`
///
/// # Response
/// ## Ok
/// ```
/// [
///     {
///         "id": 9,
///         "content": "Nice read",
///         "userId": 3,
///         "postId": 12,
///         "createdAt": "2025-03-01T09:22:30.664361",
///         "updatedAt": "2025-03-01T09:22:30.664361"
///     }
/// ]
/// ```
#[get("/posts/{post_id}/comments")]
pub async fn get_comments(app_state: Data<AppState>, post_id: Path<i32>) -> Result<HttpResponse, AppError> {
    let post_id = post_id.into_inner();

    let comments = app_state.run(move |conn| Comment::find_by_post(conn, post_id)).await?;
    Ok(HttpResponse::Ok().json(comments))
}

#[delete("/comments/{comment_id}")]
pub async fn delete_comment(app_state: Data<AppState>, comment_id: Path<i32>) -> Result<HttpResponse, AppError> {
    let comment_id = comment_id.into_inner();

    if !app_state.run(move |conn| Comment::delete(conn, comment_id)).await? {
        return Err(AppError::not_found("Comment not found"));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Comment deleted" })))
}
