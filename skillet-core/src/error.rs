use thiserror::Error;

use crate::pipeline::Stage;

/// Error from the vision or text-generation services.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("service reported error: {0}")]
    Service(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Error from blob storage uploads.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("invalid media: {0}")]
    InvalidMedia(String),

    #[error("upload session failed: {0}")]
    SessionFailed(String),

    #[error("no blob stored at {0}")]
    NotFound(String),

    #[error("upload already consumed for this submission")]
    AlreadyUsed,
}

/// Error from the realtime data store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("write to {path} failed: {message}")]
    WriteFailed { path: String, message: String },

    #[error("failed to decode record at {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Terminal failure of a generation pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("stage {stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: UpstreamError,
    },

    #[error("media library access denied")]
    PermissionDenied,

    #[error("failed to read image: {0}")]
    ImageRead(#[from] std::io::Error),
}

impl PipelineError {
    /// The stage the run failed in, if it got that far.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
