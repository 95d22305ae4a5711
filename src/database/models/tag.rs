use diesel::{prelude::*, PgConnection};
use serde::{Deserialize, Serialize};

use crate::{app::AppError, schema::tags};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = tags)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = tags)]
struct TagInsert<'a> {
    name: &'a str,
}

/// Tags as clients send them: either a JSON list or one comma separated string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagInput {
    List(Vec<String>),
    Text(String),
}

impl TagInput {
    /// Trimmed, non-empty, de-duplicated names in first-seen order.
    pub fn names(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            TagInput::List(list) => list.iter().map(String::as_str).collect(),
            TagInput::Text(text) => text.split(',').collect(),
        };

        let mut names: Vec<String> = Vec::with_capacity(raw.len());
        for name in raw.into_iter().map(str::trim).filter(|name| !name.is_empty()) {
            if !names.iter().any(|seen| seen == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}

impl Tag {
    pub fn new(conn: &mut PgConnection, tag_name: &str) -> Result<Tag, AppError> {
        let tag_name = tag_name.trim();
        if tag_name.is_empty() {
            return Err(AppError::validation("Tag name is required"));
        }

        Ok(diesel::insert_into(tags::table)
            .values(&TagInsert { name: tag_name })
            .returning(Tag::as_returning())
            .get_result(conn)?)
    }

    pub fn all(conn: &mut PgConnection) -> Result<Vec<Tag>, AppError> {
        Ok(tags::table
            .order(tags::name.asc())
            .select(Tag::as_select())
            .load(conn)?)
    }

    /// Looks a tag up by its exact name and creates it when missing.
    /// The insert is a no-op when a concurrent request created the same name first.
    pub fn find_or_create(conn: &mut PgConnection, tag_name: &str) -> Result<Tag, AppError> {
        diesel::insert_into(tags::table)
            .values(&TagInsert { name: tag_name })
            .on_conflict(tags::name)
            .do_nothing()
            .execute(conn)?;

        Ok(tags::table
            .filter(tags::name.eq(tag_name))
            .select(Tag::as_select())
            .first(conn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_comma_separated_tags() {
        let input: TagInput = serde_json::from_str(r#"" rust, web ,,diesel , rust""#).unwrap();
        assert_eq!(input.names(), vec!["rust", "web", "diesel"]);
    }

    #[test]
    fn test_tag_list() {
        let input: TagInput = serde_json::from_str(r#"["Rust", "  ", "rust", "Rust "]"#).unwrap();
        // matching is exact, so differently cased names stay distinct
        assert_eq!(input.names(), vec!["Rust", "rust"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(TagInput::Text(String::new()).names().is_empty());
        assert!(TagInput::List(vec![" ".into(), "".into()]).names().is_empty());
    }
}
