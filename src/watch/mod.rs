// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling the `watch` glob of each asset class into a profile.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//!
//! It does **not** know whether a task is running; it only turns filesystem
//! changes into task-level triggers. Coalescing happens in the engine.

pub mod event_handler;
pub mod patterns;
pub mod watcher;

pub use patterns::{TaskWatchProfile, build_profiles_from_config};
pub use watcher::{WatcherHandle, spawn_watcher};
