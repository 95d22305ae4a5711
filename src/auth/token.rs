use chrono::{Duration, NaiveDateTime, Utc};
use rand::distributions::{Alphanumeric, DistString};

use crate::database::models::session::Session;

pub const TOKEN_LEN: usize = 32;

pub struct Token {}

impl Token {
    /// Random alphanumeric session token.
    pub fn generate() -> String {
        Alphanumeric.sample_string(&mut rand::thread_rng(), TOKEN_LEN)
    }

    pub fn expiry(ttl: Duration) -> NaiveDateTime {
        Utc::now().naive_utc() + ttl
    }

    /// Fresh session for `user_id`, not yet stored.
    pub fn session_for(user_id: i32, ttl: Duration) -> Session {
        Session {
            session_token: Token::generate(),
            user_id,
            expires: Token::expiry(ttl),
        }
    }
}
