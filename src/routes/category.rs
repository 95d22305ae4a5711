use actix_web::{get, web::Data, HttpResponse};

use crate::{
    app::{AppError, AppState},
    database::models::category::Category,
};

/// Pipe for listing the categories. The five default categories are created
/// the first time this is called on an empty table
/// - url: `{domain}/categories`
#[get("/categories")]
pub async fn list_categories(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let categories = app_state.run(Category::all_seeded).await?;
    Ok(HttpResponse::Ok().json(categories))
}
