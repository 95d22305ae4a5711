use chrono::NaiveDateTime;
use diesel::{prelude::*, PgConnection};
use serde::Serialize;

use crate::{app::AppError, schema::verification_tokens};

/// One-shot token (e-mail sign-in, address confirmation) keyed by (identifier, token).
#[derive(Debug, Clone, PartialEq, Insertable, Queryable, Selectable, Serialize)]
#[diesel(table_name = verification_tokens)]
pub struct VerificationToken {
    pub identifier: String,
    pub token: String,
    pub expires: NaiveDateTime,
}

impl VerificationToken {
    pub fn new(conn: &mut PgConnection, token: &VerificationToken) -> Result<VerificationToken, AppError> {
        Ok(diesel::insert_into(verification_tokens::table)
            .values(token)
            .returning(VerificationToken::as_returning())
            .get_result(conn)?)
    }

    /// Deletes and returns the token in a single statement, so it can be used at most once.
    pub fn consume(conn: &mut PgConnection, identifier: &str, token: &str) -> Result<Option<VerificationToken>, AppError> {
        Ok(diesel::delete(
            verification_tokens::table
                .filter(verification_tokens::identifier.eq(identifier))
                .filter(verification_tokens::token.eq(token)),
        )
        .returning(VerificationToken::as_returning())
        .get_result(conn)
        .optional()?)
    }
}
