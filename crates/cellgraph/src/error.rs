//! Error types for cellgraph operations.
//!
//! Bulk graph operations skip stale references instead of failing, so the
//! errors here are limited to direct store misuse, configuration loading
//! and I/O. [`CellGraphError`] wraps all of them and is what
//! [`load_config`](crate::config::load_config) returns.

use std::{io, path::PathBuf};

use thiserror::Error;

use cellgraph_core::identifier::Id;

/// The main error type for cellgraph operations.
#[derive(Debug, Error)]
pub enum CellGraphError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Misuse of the cell store primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown cell `{0}`")]
    UnknownCell(Id),

    #[error("cell `{0}` already exists")]
    DuplicateId(Id),

    #[error("cell `{0}` already has a parent")]
    AlreadyAttached(Id),

    #[error("cell `{0}` has no parent")]
    NotAttached(Id),

    #[error("adding `{child}` under `{parent}` would make it its own ancestor")]
    CyclicParent { parent: Id, child: Id },
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}
