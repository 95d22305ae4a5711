use actix_web::{
    delete, get, post, put,
    web::{Data, Json},
    HttpResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::present;
use crate::{
    app::{AppError, AppState},
    auth::{
        adapter::{authorize, AuthAdapter},
        password::hash_password,
        removal_cookie, session_cookie,
        token::Token,
        AuthedUser,
    },
    database::models::{
        session::Session,
        user::{NewUser, UserChanges},
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Pipe for registering a new user with e-mail and password
/// - url: `{domain}/auth/register`
///
/// # HTTP request requirements
/// ## body
/// - json with `firstName`, `lastName`, `email` and `password`
///
/// # Response
/// ## Ok
/// ```
/// { "user": { "id": 3, "name": "Ada Lovelace", "email": "ada@example.com", ... } }
/// ```
/// ## Error
/// - Bad request, also when the e-mail is already registered
#[post("/auth/register")]
pub async fn register(app_state: Data<AppState>, payload: Json<RegisterPayload>) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let (first_name, last_name, email, password) = match (
        present(payload.first_name),
        present(payload.last_name),
        present(payload.email),
        present(payload.password),
    ) {
        (Some(first_name), Some(last_name), Some(email), Some(password)) => {
            (first_name, last_name, email.trim().to_string(), password)
        }
        _ => return Err(AppError::validation("Missing required fields")),
    };

    let user = app_state
        .run(move |conn| {
            if conn.get_user_by_email(&email)?.is_some() {
                return Err(AppError::validation("User already exists"));
            }

            conn.create_user(&NewUser {
                name: format!("{} {}", first_name.trim(), last_name.trim()),
                email,
                password: hash_password(&password)?,
                profile_picture: None,
            })
        })
        .await?;

    log::info!("user {} registered", user.id);
    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

/// Pipe for logging in as user
/// - url: `{domain}/auth/login`
///
/// # HTTP request requirements
/// ## body
/// - json with `email` and `password`
///
/// # Example
/// ```
/// let data = r#"{ "email": "ada@example.com", "password": "analytical" }"#;
/// let request = actix_web::test::TestRequest::post()
///     .uri("localhost/auth/login")
///     .set_payload(data)
///     .to_request();
/// ```
///
/// # Response
/// ## Ok
/// - set cookie header containing the session token
/// - json with the user and the session expiry
/// ## Error
/// - Bad request
/// - Unauthorized
#[post("/auth/login")]
pub async fn login(app_state: Data<AppState>, payload: Json<LoginPayload>) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let (email, password) = match (present(payload.email), present(payload.password)) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(AppError::validation("Missing email or password")),
    };

    let ttl = app_state.session_ttl;
    let (user, session) = app_state
        .run(move |conn| {
            let user = authorize(conn, email.trim(), &password)?;

            let swept = Session::delete_expired(conn, Utc::now().naive_utc())?;
            if swept > 0 {
                log::debug!("removed {} expired sessions", swept);
            }

            let session = conn.create_session(&Token::session_for(user.id, ttl))?;
            Ok((user, session))
        })
        .await?;

    log::info!("user {} logged in", user.id);
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&session.session_token, ttl))
        .json(json!({ "user": user, "expires": session.expires })))
}

/// The signed-in user and when the session expires.
#[get("/auth/session")]
pub async fn current_session(authed: AuthedUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(json!({ "user": authed.user, "expires": authed.session.expires })))
}

/// Pipe for extending the current session by the configured lifetime
/// - url: `{domain}/auth/refresh`
///
/// # Response
/// ## Ok
/// - set cookie header containing the refreshed session token
/// ## Error
/// - Unauthorized
#[put("/auth/refresh")]
pub async fn refresh_session(app_state: Data<AppState>, authed: AuthedUser) -> Result<HttpResponse, AppError> {
    let ttl = app_state.session_ttl;
    let token = authed.session.session_token.clone();

    let session = app_state
        .run(move |conn| conn.update_session(&token, Token::expiry(ttl)))
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&session.session_token, ttl))
        .json(json!({ "expires": session.expires })))
}

#[delete("/auth/logout")]
pub async fn logout(app_state: Data<AppState>, authed: AuthedUser) -> Result<HttpResponse, AppError> {
    let token = authed.session.session_token;
    app_state.run(move |conn| conn.delete_session(&token)).await?;

    log::info!("user {} logged out", authed.user.id);
    Ok(HttpResponse::Ok()
        .cookie(removal_cookie())
        .json(json!({ "message": "Logged out" })))
}

/// Pipe for editing the profile of the signed-in user
/// - url: `{domain}/auth/profile`
///
/// # HTTP request requirements
/// ## body
/// - json with any of `name`, `email`, `profilePicture`, `bio`, `github`, `twitter`, `linkedin`, `website`
///
/// # Response
/// ## Ok
/// - json of the updated user
/// ## Error
/// - Unauthorized
/// - Conflict, when the new e-mail belongs to someone else
#[put("/auth/profile")]
pub async fn update_profile(
    app_state: Data<AppState>,
    authed: AuthedUser,
    changes: Json<UserChanges>,
) -> Result<HttpResponse, AppError> {
    let user_id = authed.user.id;
    let changes = changes.into_inner();

    let user = app_state
        .run(move |conn| conn.update_user(user_id, &changes))
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(HttpResponse::Ok().json(user))
}
