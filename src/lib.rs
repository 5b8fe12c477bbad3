// Library surface for headless/integration tests and reuse.
// Terminal setup and argument parsing stay in main.rs.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod history;
pub mod logging;
pub mod runtime;
pub mod scoring;
pub mod sentences;
pub mod session;
pub mod ui;
