//! Core library for the `paddock` session replay player.
//!
//! The replay engine keeps a virtual session clock, buffers telemetry
//! streams ahead of the play head, and materializes an interpolated
//! [`replay::Snapshot`] for any instant. Streams come from a
//! [`source::DataSource`]: the OpenF1 REST API or a recorded session
//! directory. The `paddock` binary wraps the engine in a terminal player.
pub mod args;
pub mod config;
pub mod error;
pub mod replay;
pub mod source;
pub mod telemetry;
pub mod timeline;
pub mod ui;

mod app;
mod entry;
mod shutdown;
mod system;

pub use entry::run;
