use std::time::Duration;

use diesel::{
    r2d2::{ConnectionManager, Pool},
    PgConnection,
};

use crate::app::{AppError, PgPool};

/// Builds the Postgres connection pool and checks that one connection can be opened.
///
/// # Example
/// ```
/// let pool = psql_connect_to_db("postgres://localhost/dazzle", 10)?;
/// let mut conn = pool.get()?;
/// ```
pub fn psql_connect_to_db(database_url: &str, pool_size: u32) -> Result<PgPool, AppError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    let pool = Pool::builder()
        .max_size(pool_size)
        .connection_timeout(Duration::from_secs(5))
        .build(manager)?;

    log::info!("connected to postgres with a pool of {} connections", pool_size);
    Ok(pool)
}

/// Pool that never opens a connection on its own; requests for one fail after a short timeout.
#[cfg(test)]
pub fn psql_unconnected_pool() -> PgPool {
    let manager = ConnectionManager::<PgConnection>::new("postgres://localhost/unreachable");

    Pool::builder()
        .max_size(1)
        .min_idle(Some(0))
        .connection_timeout(Duration::from_millis(250))
        .build_unchecked(manager)
}
