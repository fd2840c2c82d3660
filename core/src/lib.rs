pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod host;
pub mod install;
pub mod measurement;
pub mod plugin;
pub mod presenter;
pub mod progress;
pub mod refresh;
pub mod runner;
