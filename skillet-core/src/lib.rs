pub mod config;
pub mod error;
pub mod generation;
pub mod media;
pub mod pipeline;
pub mod realtime;
pub mod sync;
pub mod types;
pub mod upload;
pub mod vision;

pub use config::ServiceConfig;
pub use error::{PipelineError, StoreError, UploadError, UpstreamError};
pub use media::{validate_photo, ImageSource, ValidatedPhoto, MAX_PHOTO_BYTES};
pub use pipeline::{PipelineOrchestrator, PipelineState, Stage};
pub use realtime::{MemoryStore, RealtimeStore, StoreSubscription};
pub use sync::{FeedSync, ReactionSync, ReviewStore};
pub use types::{
    Cuisine, Exclusivity, RecipeConstraints, Review, ReviewDraft, ReviewId, Stars, TagSet,
};
pub use upload::{
    photo_upload_key, BlobStore, BlobUpload, MediaUploader, MemoryBlobStore, UploadProgress,
    UploadState,
};
pub use vision::{VisionClient, VisionLabelExtractor};
