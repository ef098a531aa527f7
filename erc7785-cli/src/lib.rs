//! ERC-7785 chain identifier command line tool.
//!
//! Resolves chain labels to identifiers and back, inspects the registry,
//! and drives the registration flow. Reports are JSON on stdout; logs go
//! to stderr.

pub mod commands;
pub mod config;
