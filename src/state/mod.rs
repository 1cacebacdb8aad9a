pub mod auth;
pub mod draft;
pub mod session;
pub mod token;
