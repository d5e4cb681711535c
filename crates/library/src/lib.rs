//! Video library operations.
//!
//! Ties the model to a configured [store](videostream_store) and
//! [blob storage](videostream_storage):
//! - saving records with `modified_at` stamping and the publish latch,
//! - category management and the listings a site needs,
//! - attaching uploaded media to a record's payload, and
//! - rendering canonical URLs through configurable route templates.
//!
//! The primary entry point is [`Library`].

pub mod error;
mod lifecycle;
mod media;
mod routes;

pub use crate::lifecycle::{Clock, Library, resolve_variant_type};
pub use crate::media::MediaSlot;
pub use crate::routes::Router;
