use actix_web::{
    get,
    web::{Data, Path},
    HttpResponse,
};

use crate::{
    app::{AppError, AppState},
    database::models::user::User,
};

/// Pipe for the five most prolific authors, authors without posts included
/// - url: `{domain}/suggested-authors`
///
/// # Response
/// ## Ok
/// ```
/// [ { "id": 3, "name": "Ada Lovelace", "avatar": null, "postCount": 12 } ]
/// ```
#[get("/suggested-authors")]
pub async fn suggested_authors(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let authors = app_state.run(User::suggested_authors).await?;
    Ok(HttpResponse::Ok().json(authors))
}

#[get("/authors/{author_id}")]
pub async fn author_card(app_state: Data<AppState>, author_id: Path<i32>) -> Result<HttpResponse, AppError> {
    let author_id = author_id.into_inner();

    let card = app_state
        .run(move |conn| User::author_card(conn, author_id))
        .await?
        .ok_or_else(|| AppError::not_found("Author not found"))?;
    Ok(HttpResponse::Ok().json(card))
}
