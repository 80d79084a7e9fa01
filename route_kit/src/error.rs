use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Encode Error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Config Error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Duplicate route: {method} {path} is already registered")]
    DuplicateRoute { method: String, path: String },
    #[error("Unknown HTTP method: {0}")]
    UnknownMethod(String),
    #[error("Schema depth limit of {limit} exceeded (self-referential shape?)")]
    DepthLimit { limit: usize },
    #[error("Bind Error: {0}")]
    Bind(String),
    #[error("Validation Error: {field}: {reason}")]
    Validation { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Error::Validation { .. } => axum::http::StatusCode::BAD_REQUEST,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
