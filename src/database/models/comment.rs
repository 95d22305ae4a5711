use chrono::NaiveDateTime;
use diesel::{prelude::*, PgConnection};
use serde::Serialize;

use crate::{app::AppError, schema::comments};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = comments)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i32,
    pub content: String,
    pub user_id: i32,
    pub post_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = comments)]
struct CommentInsert<'a> {
    content: &'a str,
    user_id: i32,
    post_id: i32,
}

impl Comment {
    /** Creates a comment on the post specified */
    pub fn new(conn: &mut PgConnection, post_id_in: i32, user_id_in: i32, body: &str) -> Result<Comment, AppError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::validation("Comment content is required"));
        }

        let record = CommentInsert {
            content: body,
            user_id: user_id_in,
            post_id: post_id_in,
        };
        Ok(diesel::insert_into(comments::table)
            .values(&record)
            .returning(Comment::as_returning())
            .get_result(conn)?)
    }

    /** Returns all comments posted on a post, newest first */
    pub fn find_by_post(conn: &mut PgConnection, post_id_in: i32) -> Result<Vec<Comment>, AppError> {
        Ok(comments::table
            .filter(comments::post_id.eq(post_id_in))
            .order((comments::created_at.desc(), comments::id.desc()))
            .select(Comment::as_select())
            .load(conn)?)
    }

    /** Deletes a comment, returns whether it existed */
    pub fn delete(conn: &mut PgConnection, comment_id: i32) -> Result<bool, AppError> {
        let affected = diesel::delete(comments::table.find(comment_id)).execute(conn)?;
        Ok(affected > 0)
    }
}
