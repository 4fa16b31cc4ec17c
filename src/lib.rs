// Library surface for headless/integration tests and reuse.
// The binary in main.rs only owns the terminal and the CLI.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod history;
pub mod notes;
pub mod runtime;
pub mod session;
pub mod typing_policy;
pub mod ui;
pub mod util;
