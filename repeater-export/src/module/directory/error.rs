use thiserror::Error;

/// Reasons a zone contributes nothing to the export.
///
/// None of these abort a run: the pipeline logs them and moves on to the next zone.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory returned HTTP {status}")]
    Fetch { status: u16, body: String },

    #[error("unable to parse the response as {format}: {message}")]
    ParseFailure {
        format: &'static str,
        message: String,
        body: String,
    },

    #[error("unsupported data source '{0}'")]
    UnsupportedDataSource(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl DirectoryError {
    pub fn parse_failure(format: &'static str, message: impl ToString, body: &str) -> Self {
        DirectoryError::ParseFailure {
            format,
            message: message.to_string(),
            body: body.to_string(),
        }
    }

    /// Raw response body, where one was received
    pub fn body(&self) -> Option<&str> {
        match self {
            DirectoryError::Fetch { body, .. } | DirectoryError::ParseFailure { body, .. } => {
                Some(body.as_str())
            }
            _ => None,
        }
    }
}
