use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the proxy console.
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// The HTTP call could not complete (DNS, connect, reset, client timeout).
    #[error("Transport failure calling {url}: {reason}")]
    Transport { url: String, reason: String },

    /// A success response carried a body that could not be decoded.
    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// In-memory data could not be serialized for export.
    #[error("Failed to serialize export: {0}")]
    Serialization(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// An export file could not be written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the console crates.
pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_transport() {
        let err = ConsoleError::Transport {
            url: "http://localhost:8080/api/sessions".to_string(),
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Transport failure"));
        assert!(msg.contains("/api/sessions"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_error_display_decode() {
        let err = ConsoleError::Decode {
            url: "http://localhost:8080/api/credentials".to_string(),
            reason: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to decode response from http://localhost:8080/api/credentials: \
             expected value at line 1 column 1"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = ConsoleError::Config("api url must use http or https".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: api url must use http or https"
        );
    }

    #[test]
    fn test_error_display_file_write() {
        let err = ConsoleError::FileWrite {
            path: PathBuf::from("/ro/credentials.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/ro/credentials.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: ConsoleError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ConsoleError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }
}
