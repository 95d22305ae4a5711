pub mod config;

use actix_web::{error::BlockingError, http::StatusCode, web, HttpResponse, ResponseError};
use chrono::Duration;
use diesel::{
    r2d2::{ConnectionManager, Pool, PoolError},
    result::DatabaseErrorKind,
    PgConnection,
};
use thiserror::Error;

use crate::database::db_utils::psql_connect_to_db;
#[cfg(test)]
use crate::database::db_utils::psql_unconnected_pool;
use config::Config;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/** Used for storing the database connections when handling requests */
#[derive(Clone)]
pub struct AppState {
    pub psql_pool: PgPool,
    pub session_ttl: Duration,
}

impl AppState {
    pub fn new(config: &Config) -> Result<AppState, AppError> {
        Ok(AppState {
            psql_pool: psql_connect_to_db(&config.database_url, config.pool_size)?,
            session_ttl: config.session_ttl,
        })
    }

    /// State whose pool never dials the database until a connection is requested.
    /// Handlers that fail validation never touch the pool, which is what the tests rely on.
    #[cfg(test)]
    pub fn unconnected() -> AppState {
        AppState {
            psql_pool: psql_unconnected_pool(),
            session_ttl: Duration::days(30),
        }
    }

    /// State backed by the database named in `DATABASE_URL`, for store-backed tests.
    #[cfg(test)]
    pub fn for_tests() -> AppState {
        let config = Config::from_env().expect("DATABASE_URL must name a migrated test database");
        AppState::new(&config).expect("test database is unreachable")
    }

    /// Runs `query` with a pooled connection on the blocking thread pool.
    ///
    /// # Example
    /// ```
    /// let post = app_state.run(move |conn| Post::find(conn, &post_ref)).await?;
    /// ```
    pub async fn run<F, T>(&self, query: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.psql_pool.clone();
        web::block(move || {
            let mut conn = pool.get()?;
            query(&mut conn)
        })
        .await?
    }
}

/** Holds the errors we will used during request processing */
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// The cause is logged, never sent to the caller.
    #[error("Internal server error")]
    Storage(String),
    #[error("{0}")]
    Config(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> AppError {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> AppError {
        AppError::NotFound(msg.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Storage(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Storage(cause) => log::error!("storage failure: {}", cause),
            AppError::Config(cause) => log::error!("configuration failure: {}", cause),
            other => log::debug!("request rejected: {}", other),
        }

        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::Error;

        match err {
            Error::NotFound => AppError::NotFound("Not found".into()),
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                log::debug!("unique violation: {}", info.message());
                AppError::Conflict("Already exists".into())
            }
            Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                log::debug!("foreign key violation: {}", info.message());
                AppError::Validation("Invalid reference".into())
            }
            Error::DatabaseError(DatabaseErrorKind::CheckViolation, info)
            | Error::DatabaseError(DatabaseErrorKind::NotNullViolation, info) => {
                log::debug!("constraint violation: {}", info.message());
                AppError::Validation("Invalid value".into())
            }
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<PoolError> for AppError {
    fn from(err: PoolError) -> Self {
        AppError::Storage(format!("connection pool: {}", err))
    }
}

impl From<BlockingError> for AppError {
    fn from(err: BlockingError) -> Self {
        AppError::Storage(format!("blocking pool: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorInformation, Error};

    struct Info(&'static str);

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, msg: &'static str) -> Error {
        Error::DatabaseError(kind, Box::new(Info(msg)))
    }

    #[test]
    fn test_diesel_errors_map_to_statuses() {
        let not_found: AppError = Error::NotFound.into();
        pretty_assertions::assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let unique: AppError = db_error(DatabaseErrorKind::UniqueViolation, "duplicate key").into();
        pretty_assertions::assert_eq!(unique.status_code(), StatusCode::CONFLICT);
        pretty_assertions::assert_eq!(unique.to_string(), "Already exists");

        let fk: AppError = db_error(DatabaseErrorKind::ForeignKeyViolation, "no such post").into();
        pretty_assertions::assert_eq!(fk.status_code(), StatusCode::BAD_REQUEST);

        let check: AppError = db_error(DatabaseErrorKind::CheckViolation, "self follow").into();
        pretty_assertions::assert_eq!(check.status_code(), StatusCode::BAD_REQUEST);

        let other: AppError = Error::RollbackTransaction.into();
        pretty_assertions::assert_eq!(other.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_rt::test]
    async fn test_constraint_details_stay_out_of_the_body() {
        let cases = [
            (
                DatabaseErrorKind::UniqueViolation,
                "duplicate key value violates unique constraint \"posts_slug_key\"",
                "Already exists",
            ),
            (
                DatabaseErrorKind::ForeignKeyViolation,
                "insert or update on table \"likes\" violates foreign key constraint \"likes_post_id_fkey\"",
                "Invalid reference",
            ),
            (
                DatabaseErrorKind::CheckViolation,
                "new row for relation \"follows\" violates check constraint \"follows_check\"",
                "Invalid value",
            ),
            (
                DatabaseErrorKind::NotNullViolation,
                "null value in column \"title\" of relation \"posts\" violates not-null constraint",
                "Invalid value",
            ),
        ];

        for (kind, raw, expected) in cases {
            let err: AppError = db_error(kind, raw).into();
            let body = actix_web::body::to_bytes(err.error_response().into_body()).await.unwrap();
            let body = String::from_utf8(body.to_vec()).unwrap();
            pretty_assertions::assert_eq!(body, expected);
            assert!(!body.contains("constraint"));
        }
    }

    #[test]
    fn test_storage_cause_is_not_exposed() {
        let err = AppError::Storage("password authentication failed for user dazzle".into());
        pretty_assertions::assert_eq!(err.to_string(), "Internal server error");
    }
}
