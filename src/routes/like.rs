use actix_web::{
    post,
    web::{Data, Json},
    HttpResponse,
};

use super::UserPostPayload;
use crate::{
    app::{AppError, AppState},
    database::models::like::Like,
};

/// Pipe for liking a post
/// - url: `{domain}/like`
///
/// # HTTP request requirements
/// ## body
/// - json with `userId` and `postId`
///
/// # Response
/// ## Created
/// - json of the like, the post's counter is incremented with it
/// ## Error
/// - Bad request
/// - Conflict, when the user already liked the post
#[post("/like")]
pub async fn like_post(app_state: Data<AppState>, payload: Json<UserPostPayload>) -> Result<HttpResponse, AppError> {
    let (user_id, post_id) = payload.required()?;

    let like = app_state.run(move |conn| Like::new(conn, user_id, post_id)).await?;
    Ok(HttpResponse::Created().json(like))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use diesel::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::{
        database::{
            models::{post::Post, user::User},
            testing,
        },
        routes::testing::{connected_app, unconnected_app},
        schema::likes,
    };

    #[actix_rt::test]
    async fn test_like_requires_both_ids() {
        let app = test::init_service(unconnected_app()).await;

        let req = test::TestRequest::post()
            .uri("/like")
            .set_json(json!({ "postId": 3 }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    #[ignore = "needs DATABASE_URL pointing at a migrated Postgres database"]
    async fn test_duplicate_like_is_a_conflict_and_keeps_one_row() {
        let app_state = AppState::for_tests();
        let mut conn = app_state.psql_pool.get().unwrap();
        let user = testing::user(&mut conn);
        let post = testing::post(&mut conn, user.id, true);
        drop(conn);

        let app = test::init_service(connected_app()).await;
        let like = || {
            test::TestRequest::post()
                .uri("/like")
                .set_json(json!({ "userId": user.id, "postId": post.id }))
                .to_request()
        };

        assert_eq!(test::call_service(&app, like()).await.status(), StatusCode::CREATED);
        assert_eq!(test::call_service(&app, like()).await.status(), StatusCode::CONFLICT);

        let mut conn = app_state.psql_pool.get().unwrap();
        let rows: i64 = likes::table
            .filter(likes::user_id.eq(user.id))
            .filter(likes::post_id.eq(post.id))
            .count()
            .get_result(&mut *conn)
            .unwrap();
        assert_eq!(rows, 1);

        let counted = Post::get_by_id(&mut conn, post.id).unwrap().unwrap();
        assert_eq!(counted.likes, 1);

        User::delete(&mut conn, user.id).unwrap();
    }
}
