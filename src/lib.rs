// src/lib.rs
pub mod app;
pub mod config;
pub mod dump;
pub mod errors;
pub mod event;
pub mod format;
pub mod player;
pub mod podcast;
pub mod podcast_fetch;
pub mod terminal_ui;
pub mod theme;
pub mod view;

pub mod widgets;
