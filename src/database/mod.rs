pub mod db_utils;
pub mod models;

#[cfg(test)]
pub mod testing;
