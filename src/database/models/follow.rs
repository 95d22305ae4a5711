use diesel::{prelude::*, PgConnection};

use crate::{app::AppError, schema::follows};

#[derive(Debug, Clone, PartialEq, Insertable, Queryable, Selectable)]
#[diesel(table_name = follows)]
pub struct Follow {
    pub follower_id: i32,
    pub following_id: i32,
}

impl Follow {
    /// Flips the follower -> following edge. Returns whether the edge exists afterwards.
    pub fn toggle(conn: &mut PgConnection, follower: i32, following: i32) -> Result<bool, AppError> {
        if follower == following {
            return Err(AppError::validation("Cannot follow yourself"));
        }

        conn.transaction(|conn| {
            let removed = diesel::delete(
                follows::table
                    .filter(follows::follower_id.eq(follower))
                    .filter(follows::following_id.eq(following)),
            )
            .execute(conn)?;

            if removed > 0 {
                return Ok(false);
            }

            diesel::insert_into(follows::table)
                .values(&Follow {
                    follower_id: follower,
                    following_id: following,
                })
                .on_conflict_do_nothing()
                .execute(conn)?;
            Ok(true)
        })
    }

    pub fn exists(conn: &mut PgConnection, follower: i32, following: i32) -> Result<bool, AppError> {
        Ok(diesel::select(diesel::dsl::exists(
            follows::table
                .filter(follows::follower_id.eq(follower))
                .filter(follows::following_id.eq(following)),
        ))
        .get_result(conn)?)
    }

    /// Ids of the users `user` follows.
    pub fn following_of(conn: &mut PgConnection, user: i32) -> Result<Vec<i32>, AppError> {
        Ok(follows::table
            .filter(follows::follower_id.eq(user))
            .order(follows::following_id.asc())
            .select(follows::following_id)
            .load(conn)?)
    }

    /// Ids of the users following `user`.
    pub fn followers_of(conn: &mut PgConnection, user: i32) -> Result<Vec<i32>, AppError> {
        Ok(follows::table
            .filter(follows::following_id.eq(user))
            .order(follows::follower_id.asc())
            .select(follows::follower_id)
            .load(conn)?)
    }
}
