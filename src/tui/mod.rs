mod app;
mod config;
mod models;
mod runner;
mod terminal;
mod ui;

pub use config::AppConfig;
pub use runner::run;
