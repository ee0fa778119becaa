use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::StructuredSummary;

/// Open the destination once per run: the file is truncated here, and every summary written
/// afterwards is appended to it. Stdout when no path is given.
pub fn open_sink(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    match path {
        Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        None => Ok(Box::new(io::stdout())),
    }
}

/// Write one rendered summary followed by a newline
pub fn emit(out: &mut dyn Write, rendered: &str) -> io::Result<()> {
    writeln!(out, "{rendered}")
}

/// Render summary as pretty-printed JSON
pub fn render_json(summary: &StructuredSummary) -> String {
    // Plain strings and vectors always serialize.
    serde_json::to_string_pretty(summary).unwrap_or_default()
}

/// Render summary as readable text: title, summary, chapter list, keywords
pub fn render_text(summary: &StructuredSummary) -> String {
    let mut out = format!("{}\n\n{}\n", summary.title, summary.summary);

    if !summary.chapters.is_empty() {
        out.push_str("\nChapters:\n");
        for chapter in &summary.chapters {
            out.push_str(&format!("  {}  {}\n", chapter.timestamp, chapter.topic));
        }
    }

    if !summary.keywords.is_empty() {
        out.push_str(&format!("\nKeywords: {}\n", summary.keywords.join(", ")));
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Chapter;

    fn sample_summary() -> StructuredSummary {
        StructuredSummary {
            title: "Test Video".to_string(),
            summary: "A short test.".to_string(),
            chapters: vec![
                Chapter {
                    timestamp: "00:00".to_string(),
                    topic: "Intro".to_string(),
                },
                Chapter {
                    timestamp: "01:30".to_string(),
                    topic: "Details".to_string(),
                },
            ],
            keywords: vec!["rust".to_string(), "testing".to_string()],
        }
    }

    #[test]
    fn test_render_text() {
        let output = render_text(&sample_summary());
        assert_eq!(
            output,
            "Test Video\n\nA short test.\n\nChapters:\n  00:00  Intro\n  01:30  Details\n\nKeywords: rust, testing"
        );
    }

    #[test]
    fn test_render_text_without_chapters_or_keywords() {
        let summary = StructuredSummary {
            chapters: vec![],
            keywords: vec![],
            ..sample_summary()
        };
        assert_eq!(render_text(&summary), "Test Video\n\nA short test.");
    }

    #[test]
    fn test_sink_keeps_every_summary() {
        let path = std::env::temp_dir().join(format!("ytdigest-sink-{}.txt", std::process::id()));
        std::fs::write(&path, "stale").unwrap();

        let mut sink = open_sink(Some(&path)).unwrap();
        emit(&mut sink, "first").unwrap();
        emit(&mut sink, "second").unwrap();
        sink.flush().unwrap();
        drop(sink);

        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(written, "first\nsecond\n");
    }

    #[test]
    fn test_render_json_round_trips() {
        let summary = sample_summary();
        let json = render_json(&summary);
        let parsed: StructuredSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
        assert!(json.contains("\"chapters\""));
    }
}
