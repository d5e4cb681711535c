//! Persistent store for video records and categories.
//!
//! The store is the source of truth for everything an editor types in; media
//! files themselves live in blob storage and are only referenced here by
//! their relative path.
//!
//! # Architecture
//! - [`VideoStore`] is the interface the lifecycle layer talks to.
//! - [`SqliteStore`] implements it on a [`Database`] pool with embedded
//!   migrations. Slug uniqueness is a unique index, so two editors racing for
//!   the same slug cannot both win.
//! - `MockStore` (feature `mock`) implements it in memory for other crates'
//!   tests.

mod db;
pub mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod models;
mod sqlite;
mod store;

pub use crate::db::Database;
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::MockStore;
pub use crate::sqlite::SqliteStore;
pub use crate::store::{StoreHandle, VideoStore};
