//! # Charwright - THE BINARY (library half)
//!
//! Everything around the rules engine that touches the outside world:
//! configuration, catalog loading from disk, the save client, and the HTTP
//! API. The CLI in `main.rs` is a thin layer over these modules.

pub mod api;
pub mod config;
pub mod loader;
pub mod persist;
