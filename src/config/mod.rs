// src/config/mod.rs

//! Task file loading and validation.
//!
//! - [`model`] is the TOML-backed data model.
//! - [`loader`] reads a task file from disk.
//! - [`validate`] checks file-level invariants; graph-level invariants are
//!   checked when the engine is built.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigSection, RawTaskFile, TaskConfig, TaskFile};
