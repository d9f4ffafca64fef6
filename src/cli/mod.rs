//! Command-line interface module.
//!
//! This module handles:
//! - Argument parsing via clap
//! - The replay, proxy and info command implementations

pub mod args;
pub mod info;
pub mod proxy;
pub mod replay;

pub use args::{Cli, Command, SourceFormat};
