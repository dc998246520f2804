//! # docgraph-lib
//!
//! `docgraph-lib` holds the configuration and logging utilities shared by the `docgraph` crates.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod defaults;
pub mod utils;
