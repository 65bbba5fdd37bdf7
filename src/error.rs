use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not open camera {index}")]
    CameraUnavailable { index: i32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("OpenCV error {0:?}")]
    OpenCv(#[from] opencv::Error),
}

/// Failures of a single analysis call. The loop swallows these.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to encode frame {0:?}")]
    Encode(#[from] opencv::Error),
    #[error("Request failed {0}")]
    Http(#[from] reqwest::Error),
    #[error("Analyzer returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Malformed analyzer response {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}
