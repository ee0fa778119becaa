use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Parser)]
#[command(
    name = "ytdigest",
    about = "Summarize a YouTube video into structured JSON",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL (reads one URL per line from stdin if omitted)
    pub url: Option<String>,

    /// Output format: json (default), text
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file (default: ~/.config/ytdigest/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// HTTP(S) proxy for transcript requests, e.g. user:pass@host:port
    #[arg(long)]
    pub proxy: Option<String>,

    /// LLM model for summarization
    #[arg(long)]
    pub model: Option<String>,

    /// Seconds allowed for transcript extraction
    #[arg(long)]
    pub extract_timeout: Option<f64>,

    /// Seconds allowed for the LLM response
    #[arg(long)]
    pub llm_timeout: Option<f64>,

    /// Show pipeline settings and error kinds
    #[arg(short, long)]
    pub verbose: bool,
}
