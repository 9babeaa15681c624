mod app;
mod config;
mod effects;
mod transcript;
mod ui;

pub use app::run_app;
