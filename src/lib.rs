//! Durable JSON document store with backup-before-write and change tracking.
//!
//! One pretty-printed JSON file holds the whole document. Every write copies
//! the previous version to a `.bak` sibling before replacing the file, every
//! update logs a key-level diff of what it changed, and [`ChangeTracker`]
//! reports what any async operation did to the document.
//!
//! ```rust,no_run
//! use json_ledger::DocumentStore;
//! use serde_json::json;
//!
//! # async fn demo() -> json_ledger::Result<()> {
//! let store = DocumentStore::open("db.json");
//! store
//!     .write(&json!({ "alice": 120 }), Some("admin"), Some("setup"))
//!     .await?;
//! let diff = store
//!     .update(
//!         |mut doc| {
//!             doc.insert("bob".into(), json!(80));
//!             Some(doc)
//!         },
//!         None,
//!         None,
//!     )
//!     .await?;
//! println!("changed keys: {}", diff.len());
//! # Ok(())
//! # }
//! ```
//!
//! **Single-process only.** If multiple processes open the same file they will
//! clobber each other. Use advisory file locking or a real database for
//! multi-process access.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod diff;
pub mod error;
pub mod persist;
pub mod store;
pub mod track;

pub use diff::{Change, Diff};
pub use error::{Error, Result};
pub use store::{Document, DocumentStore, DocumentStoreBuilder};
pub use track::{Actor, ChangeTracker};
