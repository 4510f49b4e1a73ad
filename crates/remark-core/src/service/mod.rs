//! Comment store service module
//!
//! [`DataStore`] is the entry point for everyday comment operations. It wraps
//! a storage [`Engine`](crate::store::Engine) and an
//! [`AdminStore`](crate::admin::AdminStore), both injected at construction.
//!
//! # Example
//!
//! ```ignore
//! use remark_core::admin::StaticAdminStore;
//! use remark_core::service::DataStore;
//! use remark_core::store::MemoryEngine;
//!
//! let store = DataStore::new(
//!     Arc::new(MemoryEngine::new()),
//!     Arc::new(StaticAdminStore::new("secret", vec![])),
//! );
//! let id = store.create(comment)?;
//! let voted = store.vote(&locator, &id, "user2", true)?;
//! ```

mod datastore;
mod locks;

pub use datastore::{DataStore, EditRequest, DEV_USER_ID};
pub use locks::ScopedLocks;
