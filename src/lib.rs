// src/lib.rs

pub mod api;
pub mod app;
pub mod chat;
pub mod chat_message;
pub mod chat_view;
pub mod config;
pub mod constants;
pub mod errors;
pub mod key_handlers;
pub mod log_view;
pub mod logging;
pub mod markdown;
pub mod models;
pub mod splash_screen;
pub mod status_indicator;
pub mod streaming;
pub mod transport;
pub mod ui;
pub mod upload;
pub mod visualization;

pub use app::{App, AppScreen};
pub use chat::ChatSession;
pub use chat_message::{ChatMessage, Role};
