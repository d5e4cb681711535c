mod blob;
mod category;
mod media;
mod permalink;
mod slug;
mod tags;
mod variant;
mod video;

pub use self::blob::{BlobHandle, MediaArea};
pub use self::category::{Category, CategoryId, NewCategory};
pub use self::media::MediaKind;
pub use self::permalink::{Permalink, month_abbrev};
pub use self::slug::Slug;
pub use self::tags::Tags;
pub use self::variant::{EmbeddedVideo, EncodedUploadVideo, SelfHostedVideo, Variant, VariantKind};
pub use self::video::{Draft, Persistence, Saved, Stamps, VideoId, VideoMeta, VideoRecord};

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace('/', "").replace('-', "").replace('_', "").replace(' ', "")
}
