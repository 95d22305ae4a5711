use actix_web::{
    delete, get, post,
    web::{Data, Json, Query},
    HttpResponse,
};
use serde_json::json;

use super::{UserPostPayload, UserQuery};
use crate::{
    app::{AppError, AppState},
    database::models::bookmark::Bookmark,
};

/// Raw bookmark rows of `userId`, most recent first.
#[get("/bookmark")]
pub async fn list_bookmarks(app_state: Data<AppState>, query: Query<UserQuery>) -> Result<HttpResponse, AppError> {
    let user_id = query.required()?;

    let bookmarks = app_state.run(move |conn| Bookmark::find_by_user(conn, user_id)).await?;
    Ok(HttpResponse::Ok().json(bookmarks))
}

/// The posts `userId` bookmarked, joined server side.
#[get("/bookmark/posts")]
pub async fn bookmarked_posts(app_state: Data<AppState>, query: Query<UserQuery>) -> Result<HttpResponse, AppError> {
    let user_id = query.required()?;

    let posts = app_state.run(move |conn| Bookmark::posts_for_user(conn, user_id)).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Pipe for bookmarking a post
/// - url: `{domain}/bookmark`
///
/// # HTTP request requirements
/// ## body
/// - json with `userId` and `postId`
///
/// # Response
/// ## Created
/// - json of the new bookmark
/// ## Ok
/// - json of the bookmark that already existed for the pair
/// ## Error
/// - Bad request
#[post("/bookmark")]
pub async fn create_bookmark(
    app_state: Data<AppState>,
    payload: Json<UserPostPayload>,
) -> Result<HttpResponse, AppError> {
    let (user_id, post_id) = payload.required()?;

    let (bookmark, created) = app_state.run(move |conn| Bookmark::new(conn, user_id, post_id)).await?;
    if created {
        Ok(HttpResponse::Created().json(bookmark))
    } else {
        Ok(HttpResponse::Ok().json(bookmark))
    }
}

#[delete("/bookmark")]
pub async fn delete_bookmark(
    app_state: Data<AppState>,
    payload: Json<UserPostPayload>,
) -> Result<HttpResponse, AppError> {
    let (user_id, post_id) = payload.required()?;

    if !app_state.run(move |conn| Bookmark::delete(conn, user_id, post_id)).await? {
        return Err(AppError::not_found("Bookmark not found"));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Bookmark removed" })))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::Value;

    use super::*;
    use crate::{
        database::{models::user::User, testing},
        routes::testing::{connected_app, unconnected_app},
    };

    #[actix_rt::test]
    async fn test_bookmark_routes_validate_input() {
        let app = test::init_service(unconnected_app()).await;

        let list = test::TestRequest::get().uri("/bookmark").to_request();
        pretty_assertions::assert_eq!(test::call_service(&app, list).await.status(), StatusCode::BAD_REQUEST);

        let joined = test::TestRequest::get().uri("/bookmark/posts").to_request();
        pretty_assertions::assert_eq!(test::call_service(&app, joined).await.status(), StatusCode::BAD_REQUEST);

        let create = test::TestRequest::post()
            .uri("/bookmark")
            .set_json(json!({ "userId": 1 }))
            .to_request();
        pretty_assertions::assert_eq!(test::call_service(&app, create).await.status(), StatusCode::BAD_REQUEST);

        let remove = test::TestRequest::delete()
            .uri("/bookmark")
            .set_json(json!({}))
            .to_request();
        pretty_assertions::assert_eq!(test::call_service(&app, remove).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    #[ignore = "needs DATABASE_URL pointing at a migrated Postgres database"]
    async fn test_bookmark_pair_is_unique() {
        let app_state = AppState::for_tests();
        let mut conn = app_state.psql_pool.get().unwrap();
        let user = testing::user(&mut conn);
        let post = testing::post(&mut conn, user.id, true);
        drop(conn);

        let app = test::init_service(connected_app()).await;
        let body = json!({ "userId": user.id, "postId": post.id });

        let first = test::TestRequest::post().uri("/bookmark").set_json(&body).to_request();
        let resp = test::call_service(&app, first).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;

        let second = test::TestRequest::post().uri("/bookmark").set_json(&body).to_request();
        let resp = test::call_service(&app, second).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let existing: Value = test::read_body_json(resp).await;
        assert_eq!(existing["id"], created["id"]);

        let list = test::TestRequest::get()
            .uri(&format!("/bookmark?userId={}", user.id))
            .to_request();
        let rows: Vec<Value> = test::call_and_read_body_json(&app, list).await;
        assert_eq!(rows.len(), 1);

        let joined = test::TestRequest::get()
            .uri(&format!("/bookmark/posts?userId={}", user.id))
            .to_request();
        let posts: Vec<Value> = test::call_and_read_body_json(&app, joined).await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["id"], post.id);

        let remove = || test::TestRequest::delete().uri("/bookmark").set_json(&body).to_request();
        assert_eq!(test::call_service(&app, remove()).await.status(), StatusCode::OK);
        assert_eq!(test::call_service(&app, remove()).await.status(), StatusCode::NOT_FOUND);

        let mut conn = app_state.psql_pool.get().unwrap();
        User::delete(&mut conn, user.id).unwrap();
    }
}
