//! # CLI Command Implementations
//!
//! This module contains the implementation of all CLI commands.
//! Each submodule represents a top-level command.
//!
//! ## Available Commands
//!
//! - [`scan`] - Scan workflow definitions against the declarative check set

pub mod scan;
