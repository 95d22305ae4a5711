pub mod adapter;
pub mod password;
pub mod token;

use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie},
    dev::Payload,
    http::header::Header,
    web::Data,
    FromRequest, HttpRequest,
};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use chrono::{Duration, Utc};
use futures::future::{FutureExt, LocalBoxFuture};

use crate::{
    app::{AppError, AppState},
    database::models::{session::Session, user::User},
};
use adapter::AuthAdapter;

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Session token of the request, from the `token` cookie or an `Authorization: Bearer` header.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }

    Authorization::<Bearer>::parse(req)
        .ok()
        .map(|auth| auth.into_scheme().token().to_string())
}

pub fn session_cookie(token: &str, ttl: Duration) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::seconds(ttl.num_seconds()))
        .finish()
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// The signed-in user behind a request. Extraction fails with 401 when the
/// token is missing, unknown or expired; expired sessions are deleted on sight.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub user: User,
    pub session: Session,
}

impl FromRequest for AuthedUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = session_token(req);
        let app_state = req.app_data::<Data<AppState>>().cloned();

        async move {
            let token = token.ok_or(AppError::Unauthorized)?;
            let app_state = app_state
                .ok_or_else(|| AppError::Storage("application state is not registered".into()))?;

            let lookup = token.clone();
            let (session, user) = app_state
                .run(move |conn| conn.get_session_and_user(&lookup))
                .await?
                .ok_or(AppError::Unauthorized)?;

            if session.is_expired(Utc::now().naive_utc()) {
                log::debug!("session of user {} expired", user.id);
                app_state.run(move |conn| conn.delete_session(&token)).await?;
                return Err(AppError::Unauthorized);
            }

            Ok(AuthedUser { user, session })
        }
        .boxed_local()
    }
}
