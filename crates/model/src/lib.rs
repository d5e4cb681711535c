//! Data model for a small video-hosting CMS.
//!
//! Videos share a common base ([`VideoMeta`](models::VideoMeta)) and carry
//! exactly one concrete media [`Variant`](models::Variant): a self-hosted
//! HTML5 file, an embedded URL or snippet, or an upload for Flash encoding.
//!
//! # Lifecycle
//! Records start out as a [`Draft`](models::Draft) and become
//! [`Saved`](models::Saved) once a store accepts them. Two rules apply on every
//! save:
//! - `modified_at` is bumped, and
//! - the *publish latch* assigns `publish_at` the first time a record is saved
//!   as public. After that, `publish_at` is never touched automatically again.
//!
//! Only saved records have a [`Permalink`](models::Permalink), which is why
//! deriving one can never fail.

pub mod error;
pub mod models;
