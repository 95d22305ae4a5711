use chrono::NaiveDateTime;
use diesel::{prelude::*, PgConnection};
use serde::Serialize;

use super::user::User;
use crate::{
    app::AppError,
    schema::{sessions, users},
};

#[derive(Debug, Clone, PartialEq, Insertable, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = sessions, primary_key(session_token))]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(skip_serializing)]
    pub session_token: String,
    pub user_id: i32,
    pub expires: NaiveDateTime,
}

impl Session {
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.expires <= now
    }

    pub fn new(conn: &mut PgConnection, session: &Session) -> Result<Session, AppError> {
        Ok(diesel::insert_into(sessions::table)
            .values(session)
            .returning(Session::as_returning())
            .get_result(conn)?)
    }

    pub fn find_with_user(conn: &mut PgConnection, token: &str) -> Result<Option<(Session, User)>, AppError> {
        Ok(sessions::table
            .inner_join(users::table)
            .filter(sessions::session_token.eq(token))
            .select((Session::as_select(), User::as_select()))
            .first(conn)
            .optional()?)
    }

    pub fn set_expiry(conn: &mut PgConnection, token: &str, expires_at: NaiveDateTime) -> Result<Option<Session>, AppError> {
        Ok(diesel::update(sessions::table.find(token))
            .set(sessions::expires.eq(expires_at))
            .returning(Session::as_returning())
            .get_result(conn)
            .optional()?)
    }

    pub fn delete(conn: &mut PgConnection, token: &str) -> Result<bool, AppError> {
        let affected = diesel::delete(sessions::table.find(token)).execute(conn)?;
        Ok(affected > 0)
    }

    /// Drops every session past its expiry, returns how many went away.
    pub fn delete_expired(conn: &mut PgConnection, now: NaiveDateTime) -> Result<usize, AppError> {
        Ok(diesel::delete(sessions::table.filter(sessions::expires.le(now))).execute(conn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_session_expiry_boundary() {
        let now = Utc::now().naive_utc();
        let session = Session {
            session_token: "abc".into(),
            user_id: 1,
            expires: now,
        };

        assert!(session.is_expired(now));
        assert!(!session.is_expired(now - Duration::seconds(1)));
        assert!(session.is_expired(now + Duration::days(1)));
    }

    #[test]
    fn test_session_token_is_not_serialized() {
        let session = Session {
            session_token: "secret-token".into(),
            user_id: 4,
            expires: Utc::now().naive_utc(),
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("secret-token"));
        assert!(json.contains("\"userId\":4"));
    }
}
