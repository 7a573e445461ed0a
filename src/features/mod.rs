pub mod auth;
pub mod zones;
