use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use eyre::{Result, bail};
use log::{debug, error, info};

mod cli;

use cli::{Cli, OutputFormat};
use ytdigest::config::Config;
use ytdigest::{Pipeline, PipelineError};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytdigest.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytdigest")
        .join("logs")
}

/// File config, then environment, then command-line flags
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?.with_env()?;

    if let Some(ref proxy) = cli.proxy {
        config.proxy_url = Some(proxy.clone());
    }
    if let Some(ref model) = cli.model {
        config.model = model.clone();
    }
    if let Some(secs) = cli.extract_timeout {
        config.extract_timeout = secs;
    }
    if let Some(secs) = cli.llm_timeout {
        config.llm_timeout = secs;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if cli.verbose {
        eprintln!(
            "Model: {}\nEndpoint: {}\nProxy: {}\nTimeouts: extract {}s, llm {}s\nLanguages: {}",
            config.model,
            config.base_url,
            if config.proxy().is_some() { "configured" } else { "none" },
            config.extract_timeout,
            config.llm_timeout,
            config.languages.join(", "),
        );
    }

    let pipeline = Pipeline::from_config(&config)?;

    // Collect URLs: from arg or stdin
    let urls = if let Some(ref url) = cli.url {
        vec![url.clone()]
    } else {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
    };

    if urls.iter().all(|u| u.trim().is_empty()) {
        bail!("no URL provided\n\nUsage: ytdigest <URL>\n       echo <URL> | ytdigest");
    }

    let mut sink = ytdigest::output::open_sink(cli.output.as_deref())?;
    let mut failures = 0;
    for url in urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
        let result = match ytdigest::validate_url(url) {
            Ok(()) => pipeline.process(url).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(summary) => {
                let rendered = match cli.format {
                    OutputFormat::Json => ytdigest::output::render_json(&summary),
                    OutputFormat::Text => ytdigest::output::render_text(&summary),
                };

                ytdigest::output::emit(&mut sink, &rendered)?;
                if cli.verbose {
                    if let Some(ref path) = cli.output {
                        eprintln!("Output appended to: {}", path.display());
                    }
                }
            }
            Err(e) => {
                failures += 1;
                report(&cli, url, &e);
            }
        }
    }

    sink.flush()?;

    if failures > 0 {
        bail!("{failures} of {} URL(s) failed", urls.iter().filter(|u| !u.trim().is_empty()).count());
    }

    debug!("All URLs processed");
    Ok(())
}

fn report(cli: &Cli, url: &str, e: &PipelineError) {
    error!("{url}: [{}] {e}", e.kind());
    if cli.verbose {
        eprintln!("{url}: [{} at {} stage] {e}", e.kind(), e.stage());
    } else {
        eprintln!("{url}: {e}");
    }
}
