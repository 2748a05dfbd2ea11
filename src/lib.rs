pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod image_resolver;
pub mod wiki;
