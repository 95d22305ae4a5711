use diesel::{prelude::*, result::DatabaseErrorKind, PgConnection};
use serde::Serialize;

use super::post::Post;
use crate::{app::AppError, schema::likes};

#[derive(Debug, Clone, PartialEq, Insertable, Queryable, Selectable, Serialize)]
#[diesel(table_name = likes)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub user_id: i32,
    pub post_id: i32,
}

impl Like {
    /// Records the like and bumps the post's counter in one transaction.
    /// A second like of the same post by the same user is a conflict, not an unlike.
    pub fn new(conn: &mut PgConnection, user: i32, post: i32) -> Result<Like, AppError> {
        let like = Like {
            user_id: user,
            post_id: post,
        };

        conn.transaction(|conn| {
            let inserted = diesel::insert_into(likes::table)
                .values(&like)
                .returning(Like::as_returning())
                .get_result(conn);

            let inserted = match inserted {
                Ok(inserted) => inserted,
                Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    return Err(AppError::Conflict("Already liked".into()))
                }
                Err(err) => return Err(err.into()),
            };

            Post::increment_likes(conn, post)?;
            Ok(inserted)
        })
    }
}
