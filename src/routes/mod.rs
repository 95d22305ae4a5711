pub mod author;
pub mod auth;
pub mod bookmark;
pub mod category;
pub mod comment;
pub mod follow;
pub mod like;
pub mod post;
pub mod tag;

use actix_web::web;
use serde::Deserialize;

use crate::app::AppError;

/// `?userId=` query shared by the listing routes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<i32>,
}

impl UserQuery {
    pub fn required(&self) -> Result<i32, AppError> {
        self.user_id.ok_or_else(|| AppError::validation("Missing userId"))
    }
}

/// `{userId, postId}` body of the like and bookmark routes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPostPayload {
    pub user_id: Option<i32>,
    pub post_id: Option<i32>,
}

impl UserPostPayload {
    pub fn required(&self) -> Result<(i32, i32), AppError> {
        match (self.user_id, self.post_id) {
            (Some(user_id), Some(post_id)) => Ok((user_id, post_id)),
            _ => Err(AppError::validation("Missing required fields")),
        }
    }
}

/// A string field counts as present only when it is not blank.
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Registers every route. Literal paths go before the `{id_or_slug}` catch-all.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default().error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default().error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    //Auth routes
    .service(auth::register)
    .service(auth::login)
    .service(auth::current_session)
    .service(auth::refresh_session)
    .service(auth::logout)
    .service(auth::update_profile)
    //Post routes
    .service(post::list_posts)
    .service(post::create_post)
    .service(post::featured_post)
    .service(post::latest_posts)
    .service(post::get_post_by_slug)
    .service(comment::get_comments)
    .service(post::get_post)
    .service(post::update_post)
    .service(post::delete_post)
    //Comment routes
    .service(comment::create_comment)
    .service(comment::delete_comment)
    //Catalog routes
    .service(category::list_categories)
    .service(tag::list_tags)
    .service(tag::create_tag)
    //Social routes
    .service(follow::toggle_follow)
    .service(follow::is_following)
    .service(follow::following)
    .service(follow::followers)
    .service(like::like_post)
    .service(bookmark::list_bookmarks)
    .service(bookmark::bookmarked_posts)
    .service(bookmark::create_bookmark)
    .service(bookmark::delete_bookmark)
    //Author routes
    .service(author::suggested_authors)
    .service(author::author_card);
}


#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test as actix_test};

    use super::*;

    #[test]
    fn test_present_rejects_blank_values() {
        assert!(present(None).is_none());
        assert!(present(Some("   ".into())).is_none());
        pretty_assertions::assert_eq!(present(Some("x".into())).as_deref(), Some("x"));
    }

    #[actix_rt::test]
    async fn test_malformed_json_is_a_bad_request() {
        let app = actix_test::init_service(testing::unconnected_app()).await;

        let req = actix_test::TestRequest::post()
            .uri("/like")
            .insert_header(actix_web::http::header::ContentType::json())
            .set_payload("{ not json")
            .to_request();

        let resp = actix_test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_non_numeric_query_is_a_bad_request() {
        let app = actix_test::init_service(testing::unconnected_app()).await;

        let req = actix_test::TestRequest::get().uri("/following?userId=abc").to_request();

        let resp = actix_test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
