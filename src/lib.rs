pub mod app;
pub mod config;
pub mod core;
pub mod format;
pub mod history;
pub mod links;
pub mod model;
pub mod palette;
pub mod stats;
pub mod ui;
