use chrono::NaiveDateTime;
use diesel::{prelude::*, PgConnection};
use serde::Serialize;

use crate::{app::AppError, schema::categories};

/// Categories created the first time the catalog is read while empty.
pub const DEFAULT_CATEGORIES: [(&str, &str); 5] = [
    ("Development", "Posts about software development."),
    ("Design", "Posts about design and UI/UX."),
    ("Technology", "Posts about technology trends."),
    ("Business", "Posts about business and startups."),
    ("Lifestyle", "Posts about lifestyle and productivity."),
];

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = categories)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = categories)]
struct CategoryInsert<'a> {
    name: &'a str,
    description: &'a str,
}

impl Category {
    pub fn all(conn: &mut PgConnection) -> Result<Vec<Category>, AppError> {
        Ok(categories::table
            .order(categories::id.asc())
            .select(Category::as_select())
            .load(conn)?)
    }

    /// Inserts [`DEFAULT_CATEGORIES`] when the table is empty. Safe to call any number of times.
    pub fn seed_if_empty(conn: &mut PgConnection) -> Result<usize, AppError> {
        let existing: i64 = categories::table.count().get_result(conn)?;
        if existing > 0 {
            return Ok(0);
        }

        let defaults = DEFAULT_CATEGORIES
            .iter()
            .map(|&(name, description)| CategoryInsert { name, description })
            .collect::<Vec<_>>();

        let inserted = diesel::insert_into(categories::table)
            .values(&defaults)
            .on_conflict(categories::name)
            .do_nothing()
            .execute(conn)?;

        log::info!("seeded {} default categories", inserted);
        Ok(inserted)
    }

    /// Lists the categories, seeding the defaults first when there are none.
    pub fn all_seeded(conn: &mut PgConnection) -> Result<Vec<Category>, AppError> {
        Category::seed_if_empty(conn)?;
        Category::all(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_category_names_are_unique() {
        let mut names = DEFAULT_CATEGORIES.iter().map(|(name, _)| *name).collect::<Vec<_>>();
        names.sort();
        names.dedup();
        pretty_assertions::assert_eq!(names.len(), DEFAULT_CATEGORIES.len());
    }
}
