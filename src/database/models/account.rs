use chrono::NaiveDateTime;
use diesel::{prelude::*, PgConnection};
use serde::{Deserialize, Serialize};

use crate::{app::AppError, schema::accounts};

/// An external identity (OAuth provider account) linked to a local user.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = accounts)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i32,
    pub user_id: i32,
    #[serde(rename = "type")]
    pub account_type: String,
    pub provider: String,
    pub provider_account_id: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub expires_at: Option<NaiveDateTime>,
    #[serde(skip_serializing)]
    pub id_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = accounts)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub user_id: i32,
    #[serde(rename = "type")]
    pub account_type: String,
    pub provider: String,
    pub provider_account_id: String,
    pub access_token: Option<String>,
    pub expires_at: Option<NaiveDateTime>,
    pub id_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
    pub refresh_token: Option<String>,
}

impl Account {
    pub fn link(conn: &mut PgConnection, account: &NewAccount) -> Result<Account, AppError> {
        Ok(diesel::insert_into(accounts::table)
            .values(account)
            .returning(Account::as_returning())
            .get_result(conn)?)
    }

    pub fn find(conn: &mut PgConnection, provider: &str, provider_account_id: &str) -> Result<Option<Account>, AppError> {
        Ok(accounts::table
            .filter(accounts::provider.eq(provider))
            .filter(accounts::provider_account_id.eq(provider_account_id))
            .select(Account::as_select())
            .first(conn)
            .optional()?)
    }

    /// Returns whether an account was unlinked.
    pub fn unlink(conn: &mut PgConnection, provider: &str, provider_account_id: &str) -> Result<bool, AppError> {
        let affected = diesel::delete(
            accounts::table
                .filter(accounts::provider.eq(provider))
                .filter(accounts::provider_account_id.eq(provider_account_id)),
        )
        .execute(conn)?;
        Ok(affected > 0)
    }
}
