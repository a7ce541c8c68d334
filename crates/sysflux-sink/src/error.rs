/// Errors that can occur within the sink layer.
///
/// The [`Emitter`](sysflux_engine::Emitter) trait itself returns
/// `anyhow::Result`; implementations in this crate return `SinkError`
/// internally and let it convert at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The sink configuration is missing a required value.
    #[error("Sink: invalid configuration: {0}")]
    InvalidConfig(String),

    /// The write endpoint URL could not be parsed.
    #[error("Sink: invalid endpoint URL '{0}'")]
    InvalidUrl(String),

    /// The password secret file could not be read.
    #[error("Sink: unable to read secret file '{path}': {source}")]
    SecretFile {
        path: String,
        source: std::io::Error,
    },

    /// An HTTP request to the write endpoint failed.
    #[error("Sink: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The write endpoint returned a non-success response.
    #[error("Sink: write rejected: status={status}, body={body}")]
    Api { status: u16, body: String },

    /// JSON serialization failed.
    #[error("Sink: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience `Result` alias for sink operations.
pub type Result<T> = std::result::Result<T, SinkError>;
