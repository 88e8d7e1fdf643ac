// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod config;
pub mod engine;
pub mod history;
pub mod metrics;
pub mod runtime;
pub mod settings;
pub mod theme;
pub mod words;
