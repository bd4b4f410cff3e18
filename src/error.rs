use thiserror::Error;

/// Unified error type for release-bump operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Version format error: '{input}' must be in the format <number>.<number>.<number>[<string>]")]
    Format { input: String },

    #[error("Version format error in {path} (pattern '{pattern}'): '{text}' is not a valid version")]
    InvalidVersionInFile {
        path: String,
        pattern: String,
        text: String,
    },

    #[error("Version not found in {path}: no line matches pattern '{pattern}'")]
    NotFound { path: String, pattern: String },

    #[error("Versions do not match: {left_path} has {left} but {right_path} has {right}")]
    Consistency {
        left_path: String,
        left: String,
        right_path: String,
        right: String,
    },

    #[error("Cannot release a version with suffix '{suffix}' in {path}")]
    Prerelease { path: String, suffix: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Aborted: {0}")]
    Aborted(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in release-bump
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a format error for the given input text
    pub fn format(input: impl Into<String>) -> Self {
        ReleaseError::Format {
            input: input.into(),
        }
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a command error with context
    pub fn command(msg: impl Into<String>) -> Self {
        ReleaseError::Command(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        ReleaseError::Remote(msg.into())
    }

    /// Create an abort error carrying the reason shown to the operator
    pub fn aborted(msg: impl Into<String>) -> Self {
        ReleaseError::Aborted(msg.into())
    }

    /// True for errors an operator can fix by answering a prompt again
    pub fn is_recoverable_input(&self) -> bool {
        matches!(self, ReleaseError::Format { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReleaseError::config("unknown template 'x'");
        assert_eq!(
            err.to_string(),
            "Configuration error: unknown template 'x'"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReleaseError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_not_found_names_file_and_pattern() {
        let err = ReleaseError::NotFound {
            path: "ivy.xml".to_string(),
            pattern: "ivy-revision".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ivy.xml"));
        assert!(msg.contains("ivy-revision"));
    }

    #[test]
    fn test_consistency_message() {
        let err = ReleaseError::Consistency {
            left_path: "ivy.xml".to_string(),
            left: "2.0.0".to_string(),
            right_path: "build.properties".to_string(),
            right: "2.0.1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Versions do not match: ivy.xml has 2.0.0 but build.properties has 2.0.1"
        );
    }

    #[test]
    fn test_only_format_errors_are_recoverable() {
        assert!(ReleaseError::format("abc").is_recoverable_input());
        assert!(!ReleaseError::aborted("no").is_recoverable_input());
        assert!(!ReleaseError::NotFound {
            path: "a".to_string(),
            pattern: "b".to_string()
        }
        .is_recoverable_input());
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (ReleaseError::format("x"), "Version format error"),
            (ReleaseError::config("x"), "Configuration error"),
            (ReleaseError::command("x"), "Command failed"),
            (ReleaseError::remote("x"), "Remote operation failed"),
            (ReleaseError::aborted("x"), "Aborted"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
