pub mod auth;
pub mod posts;
pub mod tokens;
pub mod users;
