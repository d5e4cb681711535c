//! Uploading media files into a record's payload.

use crate::Library;
use crate::error::{ErrorKind, Result, StoreResultExt};
use exn::ResultExt;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use tracing::{info, instrument, warn};
use videostream_model::error::{Error as ModelError, ErrorKind as ModelErrorKind};
use videostream_model::models::{BlobHandle, MediaArea, Variant, VariantKind, VideoRecord};
use videostream_storage::{BlobStorage, sanitize_file_name};
use videostream_store::VideoStore;

/// A file field of a video payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSlot {
    /// The file of a self-hosted video.
    Html5File,
    /// Source upload of a Flash video, to be encoded.
    FlashSource,
    /// Encoded `.flv` of a Flash video.
    FlashEncoded,
    FlashThumbnail,
}
impl MediaSlot {
    pub const ALL: [MediaSlot; 4] =
        [MediaSlot::Html5File, MediaSlot::FlashSource, MediaSlot::FlashEncoded, MediaSlot::FlashThumbnail];

    /// Storage area uploads for this slot land in.
    pub fn area(&self) -> MediaArea {
        match self {
            MediaSlot::Html5File => MediaArea::Html5,
            MediaSlot::FlashSource => MediaArea::FlashSource,
            MediaSlot::FlashEncoded => MediaArea::FlashEncoded,
            MediaSlot::FlashThumbnail => MediaArea::FlashThumbnail,
        }
    }

    /// The payload kind that has this slot.
    pub fn variant_kind(&self) -> VariantKind {
        match self {
            MediaSlot::Html5File => VariantKind::SelfHosted,
            _ => VariantKind::EncodedUpload,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaSlot::Html5File => "html5",
            MediaSlot::FlashSource => "flash-source",
            MediaSlot::FlashEncoded => "flash-encoded",
            MediaSlot::FlashThumbnail => "flash-thumbnail",
        }
    }

    /// Writes `handle` into the matching field of `variant`.
    ///
    /// A new Flash source marks the payload for encoding. Payloads without
    /// this slot are left alone.
    fn assign(&self, variant: &mut Variant, handle: BlobHandle) {
        match (self, variant) {
            (MediaSlot::Html5File, Variant::SelfHosted(video)) => video.file_reference = Some(handle),
            (MediaSlot::FlashSource, Variant::EncodedUpload(video)) => {
                video.source_upload = Some(handle);
                video.needs_encode = true;
            },
            (MediaSlot::FlashEncoded, Variant::EncodedUpload(video)) => video.encoded_output = Some(handle),
            (MediaSlot::FlashThumbnail, Variant::EncodedUpload(video)) => video.thumbnail = Some(handle),
            _ => (),
        }
    }
}
impl FromStr for MediaSlot {
    type Err = ModelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "html5" | "html5file" => Ok(MediaSlot::Html5File),
            "flashsource" | "source" => Ok(MediaSlot::FlashSource),
            "flashencoded" | "flv" => Ok(MediaSlot::FlashEncoded),
            "flashthumbnail" | "thumbnail" => Ok(MediaSlot::FlashThumbnail),
            _ => exn::bail!(ModelErrorKind::ParseError { field: "slot", value: s.to_string() }),
        }
    }
}
impl Display for MediaSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Library {
    /// Stores an uploaded file and references it from the record's payload.
    ///
    /// The file name is sanitized and never overwrites an existing file; the
    /// returned handle holds the name that was actually used. If the payload
    /// cannot be saved afterwards, the stored file is removed again.
    ///
    /// # Errors
    /// [`ErrorKind::UnknownVariant`] if the record's payload has no such
    /// slot. Nothing is stored in that case.
    #[instrument(skip_all, fields(id = %record.id(), %slot, size = data.len()))]
    pub async fn attach_media(
        &self,
        record: &mut VideoRecord,
        slot: MediaSlot,
        file_name: &str,
        data: &[u8],
    ) -> Result<BlobHandle> {
        let mut variant = record.variant.clone();
        if variant.kind() != slot.variant_kind() {
            exn::bail!(ErrorKind::UnknownVariant { expected: slot.variant_kind(), found: variant.kind() });
        }
        let destination = slot.area().destination(sanitize_file_name(file_name));
        let handle = self.storage.store(data, &destination).await.or_raise(|| ErrorKind::Storage)?;
        slot.assign(&mut variant, handle.clone());

        if let Err(err) = self.store.update_variant(record.id(), &variant).await.or_raise_store() {
            if let Err(cleanup) = self.storage.delete(handle.path()).await {
                warn!(path = %handle, error = %cleanup, "could not remove orphaned upload");
            }
            return Err(err);
        }
        record.variant = variant;
        info!(path = %handle, backend = self.storage.name(), "attached media");
        Ok(handle)
    }
}
