// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod chime;
pub mod config;
pub mod controller;
pub mod input;
pub mod logging;
pub mod quotes;
pub mod runtime;
pub mod scheduler;
pub mod timer;
pub mod view;
