//! Command implementations for the sysctx CLI
//!
//! Each submodule holds the arguments and implementation of a group of
//! related commands.

pub mod config;
pub mod host;
