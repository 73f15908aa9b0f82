// ABOUTME: Library root for caravel - exposes the pipeline and its stages.
// ABOUTME: The binary entry point is in main.rs.

pub mod config;
pub mod converge;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod preflight;
pub mod provision;
pub mod publish;
pub mod types;
