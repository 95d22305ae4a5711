use chrono::NaiveDateTime;
use diesel::{dsl::count, prelude::*, PgConnection};
use serde::{Deserialize, Serialize};

use crate::{
    app::AppError,
    schema::{posts, users},
};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = users)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    ///Argon2 PHC string of the password
    #[serde(skip_serializing)]
    pub password: String,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub github: Option<String>,
    pub twitter: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub profile_picture: Option<String>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Default, Clone, AsChangeset, Deserialize)]
#[diesel(table_name = users)]
#[serde(rename_all = "camelCase")]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(skip)]
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub github: Option<String>,
    pub twitter: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.profile_picture.is_none()
            && self.bio.is_none()
            && self.github.is_none()
            && self.twitter.is_none()
            && self.linkedin.is_none()
            && self.website.is_none()
    }
}

/// Author fields shown next to a post.
#[derive(Debug, Clone, PartialEq, Queryable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub github: Option<String>,
    pub twitter: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Smallest public view of an author, used by author cards.
#[derive(Debug, Clone, PartialEq, Queryable, Serialize)]
pub struct AuthorCard {
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAuthor {
    pub id: i32,
    pub name: String,
    pub avatar: Option<String>,
    pub post_count: i64,
}

impl User {
    /// Pushes a new user in the database. The password must already be hashed.
    pub fn new(conn: &mut PgConnection, user: &NewUser) -> Result<User, AppError> {
        if user.name.trim().is_empty() || user.email.trim().is_empty() {
            return Err(AppError::validation("Name and email are required"));
        }

        let ret_user = diesel::insert_into(users::table)
            .values(user)
            .returning(User::as_returning())
            .get_result(conn)?;

        Ok(ret_user)
    }

    /** Returns an user with the id specified */
    pub fn find_by_id(conn: &mut PgConnection, user_id: i32) -> Result<Option<User>, AppError> {
        Ok(users::table
            .find(user_id)
            .select(User::as_select())
            .first(conn)
            .optional()?)
    }

    /// Returns the user registered with `mail`, if any.
    pub fn find_by_email(conn: &mut PgConnection, mail: &str) -> Result<Option<User>, AppError> {
        Ok(users::table
            .filter(users::email.eq(mail))
            .select(User::as_select())
            .first(conn)
            .optional()?)
    }

    pub fn update(conn: &mut PgConnection, user_id: i32, changes: &UserChanges) -> Result<Option<User>, AppError> {
        if changes.is_empty() {
            return User::find_by_id(conn, user_id);
        }

        Ok(diesel::update(users::table.find(user_id))
            .set(changes)
            .returning(User::as_returning())
            .get_result(conn)
            .optional()?)
    }

    /** Deletes an user; posts, comments, likes, follows, bookmarks and sessions cascade */
    pub fn delete(conn: &mut PgConnection, user_id: i32) -> Result<bool, AppError> {
        let affected = diesel::delete(users::table.find(user_id)).execute(conn)?;
        Ok(affected > 0)
    }

    pub fn author_card(conn: &mut PgConnection, user_id: i32) -> Result<Option<AuthorCard>, AppError> {
        Ok(users::table
            .find(user_id)
            .select((users::name, users::email, users::profile_picture))
            .first::<AuthorCard>(conn)
            .optional()?)
    }

    /// Top five users by number of posts written, users without posts included.
    pub fn suggested_authors(conn: &mut PgConnection) -> Result<Vec<SuggestedAuthor>, AppError> {
        let authors = users::table
            .left_join(posts::table)
            .group_by(users::id)
            .select((
                users::id,
                users::name,
                users::profile_picture,
                count(posts::id.nullable()),
            ))
            .order_by((count(posts::id.nullable()).desc(), users::id.asc()))
            .limit(5)
            .load::<SuggestedAuthor>(conn)?;

        Ok(authors)
    }
}
