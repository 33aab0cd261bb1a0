pub mod app;
pub mod cli;
pub mod config;
pub mod events;
pub mod menu;
pub mod render;
pub mod sys;
