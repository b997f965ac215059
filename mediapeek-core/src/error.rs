use thiserror::Error;

/// Failures surfaced by the bounded fetcher. Never retried inside the crate.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Media file not found. Check the URL.")]
    NotFound,

    #[error(
        "Access denied. The link may have expired or requires authentication."
    )]
    AccessDenied,

    #[error("URL links to a webpage, not a media file. Provide a direct link.")]
    NotAMediaFile,

    #[error("Google Drive file is rate-limited. Try again in 24 hours.")]
    RateLimited,

    #[error("Could not determine file size")]
    SizeUnknown,

    #[error("Unable to access file (HTTP {status}).")]
    Status { status: u16 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl FetchError {
    /// Map a non-success HTTP status onto the fetch taxonomy.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => FetchError::NotFound,
            403 => FetchError::AccessDenied,
            other => FetchError::Status { status: other },
        }
    }

    /// Network-level failures, including non-2xx statuses other than 403/404.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::Status { .. }
                | FetchError::Transport(_)
                | FetchError::Body(_)
        )
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// Failures reported by an external metadata engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Metadata engine failed to initialise: {0}")]
    Init(String),

    #[error("Metadata engine failed to analyse data: {0}")]
    Analysis(String),

    #[error("Metadata engine returned malformed output: {0}")]
    Output(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_messages() {
        assert_eq!(
            FetchError::from_status(404).to_string(),
            "Media file not found. Check the URL."
        );
        assert!(matches!(
            FetchError::from_status(403),
            FetchError::AccessDenied
        ));
        let other = FetchError::from_status(502);
        assert!(other.is_transport());
        assert_eq!(other.to_string(), "Unable to access file (HTTP 502).");
    }
}
