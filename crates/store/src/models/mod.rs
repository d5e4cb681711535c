//! Row types and their conversions to and from the model.
//!
//! Timestamps are stored as Unix seconds, tag sets and category links as JSON
//! arrays, blob handles as their relative path.

mod category;
mod payload;
mod video;

pub(crate) use self::category::CategoryRow;
pub(crate) use self::payload::PayloadRow;
pub(crate) use self::video::{BaseRow, VideoRow};

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use time::UtcDateTime;
use videostream_model::models::BlobHandle;

pub(crate) fn from_timestamp(timestamp: i64, field: &'static str) -> Result<UtcDateTime> {
    UtcDateTime::from_unix_timestamp(timestamp).or_raise(|| ErrorKind::InvalidData(field))
}

// sqlx has no encoding for paths.
fn handle_to_text(handle: Option<&BlobHandle>, field: &'static str) -> Result<Option<String>> {
    handle
        .map(|h| h.path().to_str().map(str::to_string).ok_or_raise(|| ErrorKind::InvalidData(field)))
        .transpose()
}

fn text_to_handle(text: Option<String>) -> Option<BlobHandle> {
    text.map(BlobHandle::new)
}
