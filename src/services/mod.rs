pub mod auth;
pub mod password;
pub mod posts;
pub mod tokens;
pub mod users;
