use thiserror::Error;

pub type Result<T> = std::result::Result<T, AvatarError>;

#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Unknown value `{value}` for feature `{field}`")]
    UnknownFeatureValue { field: &'static str, value: String },
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("QR render error: {0}")]
    Render(String),
    #[error("Storage error: {0} {1}")]
    Storage(String, String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Parsing error")]
    Parse,
}

impl From<serde_json::Error> for AvatarError {
    fn from(_: serde_json::Error) -> Self {
        Self::Parse
    }
}
