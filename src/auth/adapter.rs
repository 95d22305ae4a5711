use chrono::NaiveDateTime;
use diesel::PgConnection;

use super::password::{verify_password, UNKNOWN_USER_HASH};
use crate::{
    app::AppError,
    database::models::{
        account::{Account, NewAccount},
        session::Session,
        user::{NewUser, User, UserChanges},
        verification_token::VerificationToken,
    },
};

/// The storage operations an authentication layer needs: users, linked provider
/// accounts, sessions and one-shot verification tokens.
pub trait AuthAdapter {
    fn create_user(&mut self, user: &NewUser) -> Result<User, AppError>;
    fn get_user(&mut self, user_id: i32) -> Result<Option<User>, AppError>;
    fn get_user_by_email(&mut self, email: &str) -> Result<Option<User>, AppError>;
    fn get_user_by_account(&mut self, provider: &str, provider_account_id: &str) -> Result<Option<User>, AppError>;
    fn update_user(&mut self, user_id: i32, changes: &UserChanges) -> Result<Option<User>, AppError>;
    fn delete_user(&mut self, user_id: i32) -> Result<bool, AppError>;

    fn link_account(&mut self, account: &NewAccount) -> Result<Account, AppError>;
    fn unlink_account(&mut self, provider: &str, provider_account_id: &str) -> Result<bool, AppError>;

    fn create_session(&mut self, session: &Session) -> Result<Session, AppError>;
    fn get_session_and_user(&mut self, session_token: &str) -> Result<Option<(Session, User)>, AppError>;
    fn update_session(&mut self, session_token: &str, expires: NaiveDateTime) -> Result<Option<Session>, AppError>;
    fn delete_session(&mut self, session_token: &str) -> Result<bool, AppError>;

    fn create_verification_token(&mut self, token: &VerificationToken) -> Result<VerificationToken, AppError>;
    fn use_verification_token(&mut self, identifier: &str, token: &str) -> Result<Option<VerificationToken>, AppError>;
}

impl AuthAdapter for PgConnection {
    fn create_user(&mut self, user: &NewUser) -> Result<User, AppError> {
        User::new(self, user)
    }

    fn get_user(&mut self, user_id: i32) -> Result<Option<User>, AppError> {
        User::find_by_id(self, user_id)
    }

    fn get_user_by_email(&mut self, email: &str) -> Result<Option<User>, AppError> {
        User::find_by_email(self, email)
    }

    fn get_user_by_account(&mut self, provider: &str, provider_account_id: &str) -> Result<Option<User>, AppError> {
        match Account::find(self, provider, provider_account_id)? {
            Some(account) => User::find_by_id(self, account.user_id),
            None => Ok(None),
        }
    }

    fn update_user(&mut self, user_id: i32, changes: &UserChanges) -> Result<Option<User>, AppError> {
        User::update(self, user_id, changes)
    }

    fn delete_user(&mut self, user_id: i32) -> Result<bool, AppError> {
        User::delete(self, user_id)
    }

    fn link_account(&mut self, account: &NewAccount) -> Result<Account, AppError> {
        Account::link(self, account)
    }

    fn unlink_account(&mut self, provider: &str, provider_account_id: &str) -> Result<bool, AppError> {
        Account::unlink(self, provider, provider_account_id)
    }

    fn create_session(&mut self, session: &Session) -> Result<Session, AppError> {
        Session::new(self, session)
    }

    fn get_session_and_user(&mut self, session_token: &str) -> Result<Option<(Session, User)>, AppError> {
        Session::find_with_user(self, session_token)
    }

    fn update_session(&mut self, session_token: &str, expires: NaiveDateTime) -> Result<Option<Session>, AppError> {
        Session::set_expiry(self, session_token, expires)
    }

    fn delete_session(&mut self, session_token: &str) -> Result<bool, AppError> {
        Session::delete(self, session_token)
    }

    fn create_verification_token(&mut self, token: &VerificationToken) -> Result<VerificationToken, AppError> {
        VerificationToken::new(self, token)
    }

    fn use_verification_token(&mut self, identifier: &str, token: &str) -> Result<Option<VerificationToken>, AppError> {
        VerificationToken::consume(self, identifier, token)
    }
}

/// Credential login: the user behind `email`, if `password` matches.
/// An unknown e-mail and a wrong password fail the same way.
pub fn authorize<A: AuthAdapter + ?Sized>(adapter: &mut A, email: &str, password: &str) -> Result<User, AppError> {
    let user = match adapter.get_user_by_email(email)? {
        Some(user) => user,
        None => {
            // Unknown e-mails pay the same Argon2 cost as a wrong password.
            verify_password(password, UNKNOWN_USER_HASH);
            return Err(AppError::Unauthorized);
        }
    };

    if !verify_password(password, &user.password) {
        return Err(AppError::Unauthorized);
    }

    Ok(user)
}


#[cfg(test)]
mod store_tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::{app::AppState, auth::token::Token, database::testing};

    #[actix_rt::test]
    #[ignore = "needs DATABASE_URL pointing at a migrated Postgres database"]
    async fn test_session_lifecycle() {
        let app_state = AppState::for_tests();
        let mut conn = app_state.psql_pool.get().unwrap();
        let user = testing::user(&mut conn);

        let session = conn.create_session(&Token::session_for(user.id, Duration::days(1))).unwrap();
        let (found, owner) = conn.get_session_and_user(&session.session_token).unwrap().unwrap();
        assert_eq!(found, session);
        assert_eq!(owner.id, user.id);

        let later = Utc::now().naive_utc() + Duration::days(7);
        let updated = conn.update_session(&session.session_token, later).unwrap().unwrap();
        assert_eq!(updated.user_id, user.id);

        assert!(conn.delete_session(&session.session_token).unwrap());
        assert!(conn.get_session_and_user(&session.session_token).unwrap().is_none());

        conn.delete_user(user.id).unwrap();
    }

    #[actix_rt::test]
    #[ignore = "needs DATABASE_URL pointing at a migrated Postgres database"]
    async fn test_account_link_and_unlink() {
        let app_state = AppState::for_tests();
        let mut conn = app_state.psql_pool.get().unwrap();
        let user = testing::user(&mut conn);
        let provider_account_id = Token::generate();

        conn.link_account(&NewAccount {
            user_id: user.id,
            account_type: "oauth".into(),
            provider: "github".into(),
            provider_account_id: provider_account_id.clone(),
            access_token: Some("gho_access".into()),
            expires_at: None,
            id_token: None,
            scope: Some("read:user".into()),
            token_type: Some("bearer".into()),
            refresh_token: None,
        })
        .unwrap();

        let linked = conn.get_user_by_account("github", &provider_account_id).unwrap().unwrap();
        assert_eq!(linked.id, user.id);

        assert!(conn.unlink_account("github", &provider_account_id).unwrap());
        assert!(conn.get_user_by_account("github", &provider_account_id).unwrap().is_none());

        conn.delete_user(user.id).unwrap();
    }

    #[actix_rt::test]
    #[ignore = "needs DATABASE_URL pointing at a migrated Postgres database"]
    async fn test_verification_token_is_single_use() {
        let app_state = AppState::for_tests();
        let mut conn = app_state.psql_pool.get().unwrap();
        let token = VerificationToken {
            identifier: format!("{}@example.com", Token::generate()),
            token: Token::generate(),
            expires: Utc::now().naive_utc() + Duration::hours(1),
        };

        let token = conn.create_verification_token(&token).unwrap();

        let used = conn.use_verification_token(&token.identifier, &token.token).unwrap();
        assert_eq!(used.as_ref(), Some(&token));
        assert!(conn.use_verification_token(&token.identifier, &token.token).unwrap().is_none());
    }

    #[actix_rt::test]
    #[ignore = "needs DATABASE_URL pointing at a migrated Postgres database"]
    async fn test_update_and_delete_user() {
        let app_state = AppState::for_tests();
        let mut conn = app_state.psql_pool.get().unwrap();
        let user = testing::user(&mut conn);

        let changes = UserChanges {
            bio: Some("Compilers".into()),
            ..UserChanges::default()
        };
        let updated = conn.update_user(user.id, &changes).unwrap().unwrap();
        assert_eq!(updated.bio.as_deref(), Some("Compilers"));
        assert_eq!(updated.email, user.email);

        assert!(conn.delete_user(user.id).unwrap());
        assert!(conn.get_user(user.id).unwrap().is_none());
    }
}
