//! Platform abstraction layer
//!
//! Browser bindings live in `web` and only build for wasm32. Native hosts
//! drive `sim` directly (see the headless runner in `main.rs`).

#[cfg(target_arch = "wasm32")]
pub mod web;
