use actix_web::{
    get, post,
    web::{Data, Json, Query},
    HttpResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::UserQuery;
use crate::{
    app::{AppError, AppState},
    database::models::follow::Follow,
};

/// Follower and followee of a follow edge, used both as json body and as query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowPair {
    pub follower_id: Option<i32>,
    pub following_id: Option<i32>,
}

impl FollowPair {
    fn required(&self) -> Result<(i32, i32), AppError> {
        match (self.follower_id, self.following_id) {
            (Some(follower_id), Some(following_id)) => Ok((follower_id, following_id)),
            _ => Err(AppError::validation("Missing followerId or followingId")),
        }
    }
}

/// Pipe for following or unfollowing an user. If the edge exists it is removed,
/// otherwise it is created
/// - url: `{domain}/follow`
///
/// # HTTP request requirements
/// ## body
/// - json with `followerId` and `followingId`, which must differ
///
/// # Response
/// ## Created
/// - in both directions
/// ```
/// { "followed": true }
/// ```
/// ```
/// { "followed": false }
/// ```
/// ## Error
/// - Bad request
#[post("/follow")]
pub async fn toggle_follow(app_state: Data<AppState>, payload: Json<FollowPair>) -> Result<HttpResponse, AppError> {
    let (follower_id, following_id) = payload.required()?;
    if follower_id == following_id {
        return Err(AppError::validation("Cannot follow yourself"));
    }

    let followed = app_state
        .run(move |conn| Follow::toggle(conn, follower_id, following_id))
        .await?;

    log::debug!("user {} follows user {}: {}", follower_id, following_id, followed);
    Ok(HttpResponse::Created().json(json!({ "followed": followed })))
}

#[get("/follow/is-following")]
pub async fn is_following(app_state: Data<AppState>, query: Query<FollowPair>) -> Result<HttpResponse, AppError> {
    let (follower_id, following_id) = query.required()?;

    let exists = app_state
        .run(move |conn| Follow::exists(conn, follower_id, following_id))
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "isFollowing": exists })))
}

/// Users followed by `userId`, as `[{ "followingId": .. }]`.
#[get("/following")]
pub async fn following(app_state: Data<AppState>, query: Query<UserQuery>) -> Result<HttpResponse, AppError> {
    let user_id = query.required()?;

    let ids = app_state.run(move |conn| Follow::following_of(conn, user_id)).await?;
    let body = ids
        .into_iter()
        .map(|id| json!({ "followingId": id }))
        .collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(body))
}

/// Users following `userId`, as `[{ "followerId": .. }]`.
#[get("/followers")]
pub async fn followers(app_state: Data<AppState>, query: Query<UserQuery>) -> Result<HttpResponse, AppError> {
    let user_id = query.required()?;

    let ids = app_state.run(move |conn| Follow::followers_of(conn, user_id)).await?;
    let body = ids
        .into_iter()
        .map(|id| json!({ "followerId": id }))
        .collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(body))
}
