// SPDX-License-Identifier: MIT

//! This module handles configuration, command-line parsing, and logging.

/// Command-line interface parsing.
pub mod cli;
/// Configuration file parsing and management.
pub mod config;
/// Logger initialization.
pub mod logger;
