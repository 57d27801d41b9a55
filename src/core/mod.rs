pub mod config;
pub mod errors;
pub mod events;
pub mod message;
pub mod session;
pub mod transcript;
