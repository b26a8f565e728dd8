// src/config/mod.rs

//! Configuration loading and validation for procstream.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into typed [`ExecOptions`](crate::exec::ExecOptions)
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{CommandSection, ConfigFile, ExecSection, RawConfigFile};
pub use validate::parse_duration;
