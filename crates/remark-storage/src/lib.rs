//! remark-storage - Persistent storage for remark-rs
//!
//! This crate provides the file system backed comment engine.

mod site_store;

pub use site_store::FileSystemEngine;
