//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

mod account;
mod config_gen;
mod links;
mod site;

pub use account::*;
pub use config_gen::*;
pub use links::*;
pub use site::*;
