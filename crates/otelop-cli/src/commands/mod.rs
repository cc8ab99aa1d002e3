//! CLI commands

pub mod detect;
pub mod render;
pub mod wait_hpa;
