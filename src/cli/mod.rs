pub mod app;
pub mod classify;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod draft;
pub mod env;
pub mod images;
pub mod output;
pub mod run;
pub mod runtime;

pub use app::run;
