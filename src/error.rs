use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Failure of a single pipeline run. Every variant is terminal for the request.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid YouTube URL: {url}")]
    InvalidUrl { url: String },

    #[error("could not find a video ID in: {url}")]
    VideoIdNotFound { url: String },

    #[error("transcript unavailable for {video_id}: {cause}")]
    TranscriptUnavailable { video_id: String, cause: String },

    #[error("transcript for {video_id} is empty")]
    TranscriptEmpty { video_id: String },

    #[error("transcript extraction for {video_id} exceeded {}s", .timeout.as_secs_f64())]
    ExtractionTimeout { video_id: String, timeout: Duration },

    #[error("LLM did not respond within {}s", .timeout.as_secs_f64())]
    LlmTimeout { timeout: Duration },

    #[error("LLM returned an invalid response: {cause}")]
    LlmInvalidResponse { cause: String },
}

/// Stable, machine-readable name of a [`PipelineError`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidUrl,
    VideoIdNotFound,
    TranscriptUnavailable,
    TranscriptEmpty,
    ExtractionTimeout,
    LlmTimeout,
    LlmInvalidResponse,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            PipelineError::VideoIdNotFound { .. } => ErrorKind::VideoIdNotFound,
            PipelineError::TranscriptUnavailable { .. } => ErrorKind::TranscriptUnavailable,
            PipelineError::TranscriptEmpty { .. } => ErrorKind::TranscriptEmpty,
            PipelineError::ExtractionTimeout { .. } => ErrorKind::ExtractionTimeout,
            PipelineError::LlmTimeout { .. } => ErrorKind::LlmTimeout,
            PipelineError::LlmInvalidResponse { .. } => ErrorKind::LlmInvalidResponse,
        }
    }

    /// Pipeline stage that produced the error
    pub fn stage(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InvalidUrl | ErrorKind::VideoIdNotFound => "url",
            ErrorKind::TranscriptUnavailable | ErrorKind::TranscriptEmpty | ErrorKind::ExtractionTimeout => {
                "transcript"
            }
            ErrorKind::LlmTimeout | ErrorKind::LlmInvalidResponse => "completion",
        }
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "invalid-url",
            ErrorKind::VideoIdNotFound => "video-id-not-found",
            ErrorKind::TranscriptUnavailable => "transcript-unavailable",
            ErrorKind::TranscriptEmpty => "transcript-empty",
            ErrorKind::ExtractionTimeout => "extraction-timeout",
            ErrorKind::LlmTimeout => "llm-timeout",
            ErrorKind::LlmInvalidResponse => "llm-invalid-response",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let err = PipelineError::TranscriptEmpty {
            video_id: "dQw4w9WgXcQ".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::TranscriptEmpty);
        assert_eq!(err.kind().to_string(), "transcript-empty");
        assert_eq!(err.stage(), "transcript");
    }

    #[test]
    fn test_timeout_message_includes_seconds() {
        let err = PipelineError::ExtractionTimeout {
            video_id: "dQw4w9WgXcQ".to_string(),
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "transcript extraction for dQw4w9WgXcQ exceeded 1.5s");

        let err = PipelineError::LlmTimeout {
            timeout: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "LLM did not respond within 10s");
        assert_eq!(err.stage(), "completion");
    }

    #[test]
    fn test_unavailable_message_carries_cause() {
        let err = PipelineError::TranscriptUnavailable {
            video_id: "dQw4w9WgXcQ".to_string(),
            cause: "captions are disabled".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "transcript unavailable for dQw4w9WgXcQ: captions are disabled"
        );
    }
}
