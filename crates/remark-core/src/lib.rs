//! remark-core - Core library for remark-rs
//!
//! This crate provides the consistency layer for threaded page comments:
//! the comment model, the comment store service with per-URL vote locking,
//! storage and admin directory abstractions, and export importers.

pub mod error;
pub mod types;
pub mod config;
pub mod comment;
pub mod admin;
pub mod store;
pub mod service;
pub mod migrator;

pub use error::{ErrorKind, RemarkError, Result};
pub use types::*;
