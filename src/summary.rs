use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Chapter {
    /// `MM:SS`, by prompt contract only
    pub timestamp: String,
    pub topic: String,
}

/// Validated summary of one video. All four fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StructuredSummary {
    pub title: String,
    pub summary: String,
    pub chapters: Vec<Chapter>,
    pub keywords: Vec<String>,
}

/// Parse and shape-check raw LLM output.
///
/// The rejected text is logged, never returned, so prompt drift can be diagnosed without
/// leaking model output to callers.
pub fn parse_summary(raw: &str) -> Result<StructuredSummary, PipelineError> {
    match serde_json::from_str::<StructuredSummary>(raw) {
        Ok(summary) => {
            debug!(
                "Validated summary: {} chapters, {} keywords",
                summary.chapters.len(),
                summary.keywords.len()
            );
            Ok(summary)
        }
        Err(e) => {
            warn!("Rejected LLM output: {e}");
            debug!("Rejected LLM output (raw): {raw}");
            Err(PipelineError::LlmInvalidResponse { cause: rejection_cause(&e) })
        }
    }
}

/// Caller-facing reason for a rejection. serde's own message can quote the offending value, so
/// only the category and position are kept.
fn rejection_cause(e: &serde_json::Error) -> String {
    let what = match e.classify() {
        Category::Data => "response does not match the summary schema",
        Category::Syntax => "response is not valid JSON",
        Category::Eof => "response ended before the JSON object was complete",
        Category::Io => "response could not be read",
    };
    format!("{what} (line {} column {})", e.line(), e.column())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const VALID: &str = r#"{"title":"T","summary":"S","chapters":[{"timestamp":"00:00","topic":"Intro"}],"keywords":["a","b"]}"#;

    #[test]
    fn test_valid_summary() {
        let summary = parse_summary(VALID).unwrap();
        assert_eq!(
            summary,
            StructuredSummary {
                title: "T".to_string(),
                summary: "S".to_string(),
                chapters: vec![Chapter {
                    timestamp: "00:00".to_string(),
                    topic: "Intro".to_string(),
                }],
                keywords: vec!["a".to_string(), "b".to_string()],
            }
        );

        let reencoded = serde_json::to_string(&summary).unwrap();
        assert_eq!(parse_summary(&reencoded).unwrap(), summary);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let raw = r#"{"title":"T","summary":"S","chapters":[],"keywords":[],"language":"en"}"#;
        assert!(parse_summary(raw).is_ok());
    }

    #[test]
    fn test_missing_keywords() {
        let raw = r#"{"title":"T","summary":"S","chapters":[]}"#;
        let err = parse_summary(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LlmInvalidResponse);
        assert!(err.to_string().contains("summary schema"), "{err}");
    }

    #[test]
    fn test_chapters_as_string() {
        let raw = r#"{"title":"T","summary":"S","chapters":"00:00 Intro","keywords":["a"]}"#;
        assert_eq!(parse_summary(raw).unwrap_err().kind(), ErrorKind::LlmInvalidResponse);
    }

    #[test]
    fn test_rejected_value_not_echoed() {
        let raw = r#"{"title":"T","summary":"S","chapters":"SECRET_MODEL_OUTPUT","keywords":["a"]}"#;
        let err = parse_summary(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LlmInvalidResponse);
        let msg = err.to_string();
        assert!(!msg.contains("SECRET_MODEL_OUTPUT"), "{msg}");
        assert!(msg.contains("summary schema"), "{msg}");
        assert!(msg.contains("line 1"), "{msg}");

        let raw = r#"{"title":"T","summary":"S","chapters":[],"keywords":"LEAKED_KEYWORD"}"#;
        let msg = parse_summary(raw).unwrap_err().to_string();
        assert!(!msg.contains("LEAKED_KEYWORD"), "{msg}");
    }

    #[test]
    fn test_truncated_json() {
        let raw = r#"{"title":"T","summary":"#;
        let msg = parse_summary(raw).unwrap_err().to_string();
        assert!(msg.contains("ended before"), "{msg}");
    }

    #[test]
    fn test_chapter_missing_topic() {
        let raw = r#"{"title":"T","summary":"S","chapters":[{"timestamp":"00:00"}],"keywords":[]}"#;
        assert!(parse_summary(raw).is_err());
    }

    #[test]
    fn test_wrong_scalar_types() {
        let raw = r#"{"title":1,"summary":"S","chapters":[],"keywords":[]}"#;
        assert!(parse_summary(raw).is_err());
        let raw = r#"{"title":"T","summary":"S","chapters":[],"keywords":[1,2]}"#;
        assert!(parse_summary(raw).is_err());
    }

    #[test]
    fn test_markdown_fenced_output() {
        let raw = format!("```json\n{VALID}\n```");
        let err = parse_summary(&raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LlmInvalidResponse);
        let msg = err.to_string();
        assert!(!msg.contains("```"), "{msg}");
        assert!(msg.contains("not valid JSON"), "{msg}");
    }

    #[test]
    fn test_not_json() {
        assert!(parse_summary("Here is your summary!").is_err());
        assert!(parse_summary("").is_err());
    }
}
