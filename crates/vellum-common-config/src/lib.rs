//! Configuration types for Vellum.
//!
//! This crate provides the configuration types used by Vellum response
//! writers, loaded from `vellum.yaml` files or from host init args.

pub mod types;
pub mod loader;
pub mod env;

pub use types::*;
pub use loader::*;
pub use env::*;
