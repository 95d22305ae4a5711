pub mod account;
pub mod bookmark;
pub mod category;
pub mod comment;
pub mod follow;
pub mod like;
pub mod post;
pub mod session;
pub mod tag;
pub mod user;
pub mod verification_token;
