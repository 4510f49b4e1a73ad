//! Storage engine abstractions
//!
//! The comment service never touches persistence directly; it goes through
//! the [`Engine`] trait. Engines are keyed by locator (site + URL) and
//! comment ID.

mod engine;
pub mod memory;
mod site;

pub use engine::Engine;
pub use memory::MemoryEngine;
pub use site::SiteData;
