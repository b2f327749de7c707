pub mod config;
pub mod engine;
pub mod transport;
pub mod tui;
