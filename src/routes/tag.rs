use actix_web::{
    get, post,
    web::{Data, Json},
    HttpResponse,
};
use serde::Deserialize;

use super::present;
use crate::{
    app::{AppError, AppState},
    database::models::tag::Tag,
};

/// Tags carry no description; it is only checked for presence.
#[derive(Debug, Deserialize)]
pub struct TagPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[get("/tag")]
pub async fn list_tags(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let tags = app_state.run(Tag::all).await?;
    Ok(HttpResponse::Ok().json(tags))
}

/// Pipe for creating a tag
/// - url: `{domain}/tag`
///
/// # HTTP request requirements
/// ## body
/// - json with `name` and `description`
///
/// # Response
/// ## Created
/// - json of the new tag
/// ## Error
/// - Bad request
/// - Conflict, when a tag with that name exists
#[post("/tag")]
pub async fn create_tag(app_state: Data<AppState>, payload: Json<TagPayload>) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let name = match (present(payload.name), present(payload.description)) {
        (Some(name), Some(_description)) => name,
        _ => return Err(AppError::validation("Name and description are required")),
    };

    let tag = app_state.run(move |conn| Tag::new(conn, &name)).await?;
    Ok(HttpResponse::Created().json(tag))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    use crate::{
        database::{
            models::{post::Post, user::User},
            testing,
        },
        routes::testing::{connected_app, unconnected_app},
    };

    #[actix_rt::test]
    async fn test_tag_requires_name_and_description() {
        let app = test::init_service(unconnected_app()).await;

        let req = test::TestRequest::post()
            .uri("/tag")
            .set_json(json!({ "name": "rust" }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    #[ignore = "needs DATABASE_URL pointing at a migrated Postgres database"]
    async fn test_posts_sharing_a_tag_reuse_one_row() {
        let app_state = crate::app::AppState::for_tests();
        let mut conn = app_state.psql_pool.get().unwrap();
        let user = testing::user(&mut conn);
        let category_id = testing::category(&mut conn);
        let tag_name = testing::unique("shared");

        let mut draft = testing::draft(user.id, category_id, true);
        draft.tags = vec![tag_name.clone()];
        let first = Post::new(&mut conn, &draft).unwrap();

        let mut draft = testing::draft(user.id, category_id, true);
        draft.tags = vec![tag_name.clone()];
        let second = Post::new(&mut conn, &draft).unwrap();
        drop(conn);

        let app = test::init_service(connected_app()).await;
        let tags: Vec<Value> = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/tag").to_request()).await;
        assert_eq!(tags.iter().filter(|tag| tag["name"] == tag_name.as_str()).count(), 1);

        let mut conn = app_state.psql_pool.get().unwrap();
        {
            use crate::schema::{post_tags, tags};
            use diesel::prelude::*;

            let linked: Vec<i32> = post_tags::table
                .inner_join(tags::table)
                .filter(tags::name.eq(&tag_name))
                .select(post_tags::post_id)
                .order(post_tags::post_id.asc())
                .load(&mut *conn)
                .unwrap();
            assert_eq!(linked, vec![first.id, second.id]);
        }

        User::delete(&mut conn, user.id).unwrap();
    }
}
