//! compkit - component registry client
//!
//! Resolves UI components and their registry dependencies, caches registry
//! metadata on disk, detects monorepo layouts, and writes component files
//! into the right package.

pub mod cache;
pub mod cli;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod install;
pub mod registry;
pub mod resolver;
pub mod ui;
pub mod workspace;

pub use error::{CompkitError, CompkitResult};
