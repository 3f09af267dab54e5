pub mod auth;
pub mod scene;
pub mod share;
pub mod synthesis;
