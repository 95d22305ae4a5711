use chrono::NaiveDateTime;
use diesel::{prelude::*, PgConnection};
use serde::Serialize;

use super::post::Post;
use crate::{
    app::AppError,
    schema::{bookmarks, posts},
};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = bookmarks)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: i32,
    pub user_id: i32,
    pub post_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = bookmarks)]
struct BookmarkInsert {
    user_id: i32,
    post_id: i32,
}

impl Bookmark {
    /// Bookmarks the post. When the pair already exists the stored row is returned
    /// with `false`, a repeated bookmark is not an error.
    pub fn new(conn: &mut PgConnection, user: i32, post: i32) -> Result<(Bookmark, bool), AppError> {
        let created = diesel::insert_into(bookmarks::table)
            .values(&BookmarkInsert {
                user_id: user,
                post_id: post,
            })
            .on_conflict((bookmarks::user_id, bookmarks::post_id))
            .do_nothing()
            .returning(Bookmark::as_returning())
            .get_result(conn)
            .optional()?;

        match created {
            Some(bookmark) => Ok((bookmark, true)),
            None => {
                let existing = bookmarks::table
                    .filter(bookmarks::user_id.eq(user))
                    .filter(bookmarks::post_id.eq(post))
                    .select(Bookmark::as_select())
                    .first(conn)?;
                Ok((existing, false))
            }
        }
    }

    pub fn find_by_user(conn: &mut PgConnection, user: i32) -> Result<Vec<Bookmark>, AppError> {
        Ok(bookmarks::table
            .filter(bookmarks::user_id.eq(user))
            .order((bookmarks::created_at.desc(), bookmarks::id.desc()))
            .select(Bookmark::as_select())
            .load(conn)?)
    }

    /// The bookmarked posts themselves, most recently bookmarked first.
    pub fn posts_for_user(conn: &mut PgConnection, user: i32) -> Result<Vec<Post>, AppError> {
        Ok(bookmarks::table
            .inner_join(posts::table)
            .filter(bookmarks::user_id.eq(user))
            .order((bookmarks::created_at.desc(), bookmarks::id.desc()))
            .select(Post::as_select())
            .load(conn)?)
    }

    /// Removes the exact (user, post) pair. Returns whether a row was deleted.
    pub fn delete(conn: &mut PgConnection, user: i32, post: i32) -> Result<bool, AppError> {
        let affected = diesel::delete(
            bookmarks::table
                .filter(bookmarks::user_id.eq(user))
                .filter(bookmarks::post_id.eq(post)),
        )
        .execute(conn)?;
        Ok(affected > 0)
    }
}
