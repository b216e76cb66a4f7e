pub mod auth;
pub mod permissions;
pub mod schools;
pub mod students;
pub mod users;
