//! Result and error types for quizvid.

use thiserror::Error;

/// Result type for quizvid operations
pub type QuizResult<T> = Result<T, QuizError>;

/// Errors that can occur while loading, validating or rendering quizzes
#[derive(Debug, Error)]
pub enum QuizError {
    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Quiz document could not be parsed
    #[error("Failed to parse {format} quiz: {message}")]
    Parse {
        /// Source format (json, csv, xml, yaml)
        format: String,
        /// Error message
        message: String,
    },

    /// CSV header lacks required columns
    #[error("Missing columns: {}", columns.join(", "))]
    MissingColumns {
        /// Missing column names, in canonical order
        columns: Vec<String>,
    },

    /// Quiz cannot be represented in the requested export format
    #[error("Cannot export as {format}: {message}")]
    Export {
        /// Target format
        format: String,
        /// Error message
        message: String,
    },

    /// Quiz failed validation
    #[error("Quiz validation failed: {}", issues.join("; "))]
    Validation {
        /// Human-readable error messages
        issues: Vec<String>,
    },

    /// File extension not recognised as a quiz format
    #[error("Unsupported quiz format: '{extension}' (expected json, csv or xml)")]
    UnsupportedFormat {
        /// Offending extension
        extension: String,
    },

    /// Template lookup failed
    #[error("Template not found: {name}")]
    TemplateNotFound {
        /// Requested template name
        name: String,
    },

    /// Template definition is invalid
    #[error("Invalid template: {message}")]
    Template {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// FFmpeg or ffprobe binary could not be located
    #[error("{binary} not found. Install FFmpeg or set FFMPEG_PATH / FFPROBE_PATH")]
    FfmpegNotFound {
        /// Binary name that was searched for
        binary: String,
    },

    /// FFmpeg invocation failed
    #[error("FFmpeg error: {message}")]
    Ffmpeg {
        /// Error message
        message: String,
    },

    /// Text-to-speech engine failed
    #[error("Text-to-speech failed: {message}")]
    Tts {
        /// Error message
        message: String,
    },

    /// ffprobe output could not be interpreted
    #[error("Probe failed: {message}")]
    Probe {
        /// Error message
        message: String,
    },

    /// Batch processing error
    #[error("Batch error: {message}")]
    Batch {
        /// Error message
        message: String,
    },
}

impl QuizError {
    /// Create a parse error for the given format
    #[must_use]
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an FFmpeg error
    #[must_use]
    pub fn ffmpeg(message: impl Into<String>) -> Self {
        Self::Ffmpeg {
            message: message.into(),
        }
    }

    /// Whether retrying the same job could succeed.
    ///
    /// Bad input stays bad on a second attempt; process and IO failures may not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Ffmpeg { .. } | Self::Tts { .. } | Self::Probe { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_format() {
        let err = QuizError::parse("csv", "bad row");
        assert_eq!(err.to_string(), "Failed to parse csv quiz: bad row");
    }

    #[test]
    fn test_missing_columns_lists_all() {
        let err = QuizError::MissingColumns {
            columns: vec!["option_c".to_string(), "correct_answer".to_string()],
        };
        assert_eq!(err.to_string(), "Missing columns: option_c, correct_answer");
    }

    #[test]
    fn test_validation_joins_issues() {
        let err = QuizError::Validation {
            issues: vec![
                "Question 1: Missing question text".to_string(),
                "Question 2: Need at least 2 options".to_string(),
            ],
        };
        assert!(err.to_string().contains("Question 1"));
        assert!(err.to_string().contains("; Question 2"));
    }

    #[test]
    fn test_ffmpeg_not_found_hints_env() {
        let err = QuizError::FfmpegNotFound {
            binary: "ffmpeg".to_string(),
        };
        assert!(err.to_string().contains("FFMPEG_PATH"));
    }

    #[test]
    fn test_retryable() {
        assert!(QuizError::ffmpeg("crashed").is_retryable());
        assert!(QuizError::Io(std::io::Error::other("disk")).is_retryable());
        assert!(!QuizError::parse("json", "eof").is_retryable());
        assert!(!QuizError::Validation { issues: vec![] }.is_retryable());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: QuizError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
