//! # Vigil CLI Library
//!
//! This crate provides the core functionality for the Vigil CLI,
//! a declarative security scanner for CI/CD workflow definitions.
//!
//! ## Modules
//!
//! - [`commands`] - CLI command implementations
//! - [`exit_codes`] - Standard exit codes
//! - [`output`] - Report rendering (console and JSON)

pub mod commands;
pub mod exit_codes;
pub mod output;
