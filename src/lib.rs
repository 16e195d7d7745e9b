// src/lib.rs
pub mod config;
pub mod engine;
pub mod events;
pub mod playback;
pub mod signal;
pub mod surfaces;
pub mod types;
