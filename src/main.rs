//! earnings-lens - sentiment, topic focus and a summary for pasted financial text
//!
//! Usage:
//!   earnings-lens --input call.txt                 Analyze a file with the default topics
//!   pbpaste | earnings-lens --topic margins        Read stdin, score one topic
//!   earnings-lens --input call.txt --no-topics     Skip topic scoring
//!   earnings-lens --help                           Show all options

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use earnings_lens::analysis::{AnalysisFacade, AnalysisOptions, AnalysisReport, TopicFocus};
use earnings_lens::config::PipelineConfig;
use earnings_lens::error::AnalysisError;
use earnings_lens::normalize::DEFAULT_MAX_CHARS;
use earnings_lens::pipelines::utils::DeviceRequest;
use earnings_lens::registry::{HubLoader, PipelineRegistry, Role};
use earnings_lens::topics::{Topic, TopicSet};

const DEFAULT_LOG_DIRECTIVE: &str = "earnings_lens=info";

/// Sentiment, topic focus and an abstractive summary for earnings-call text
#[derive(Parser)]
#[command(name = "earnings-lens", version, about, long_about = None)]
struct Cli {
    /// Read text from this file (default: stdin)
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Topic to score; repeat for several (default: Pricing, Demand, Margins, FX/Macro, Inflation)
    #[arg(long = "topic", short, value_parser = parse_topic)]
    topics: Vec<Topic>,

    /// Skip topic scoring entirely
    #[arg(long, conflicts_with = "topics")]
    no_topics: bool,

    /// TOML file with model identifiers
    #[arg(long, env = "EARNINGS_LENS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the sentiment checkpoint
    #[arg(long)]
    sentiment_model: Option<String>,

    /// Override the summarizer checkpoint
    #[arg(long)]
    summarizer_model: Option<String>,

    /// Override the zero-shot topic checkpoint
    #[arg(long)]
    topic_model: Option<String>,

    /// Run on this CUDA device instead of CPU
    #[arg(long)]
    cuda: Option<usize>,

    /// Character budget for the input after whitespace cleanup
    #[arg(long, default_value_t = DEFAULT_MAX_CHARS)]
    max_chars: usize,

    /// Abandon any single view after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn parse_topic(s: &str) -> std::result::Result<Topic, String> {
    s.parse()
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_toml_file(path)?,
            None => PipelineConfig::default(),
        };
        let overrides = [
            (Role::Sentiment, &self.sentiment_model),
            (Role::Summarizer, &self.summarizer_model),
            (Role::TopicClassifier, &self.topic_model),
        ];
        for (role, model) in overrides {
            if let Some(model) = model {
                config.set_model(role, model.clone());
            }
        }
        config.validate()?;
        Ok(config)
    }

    fn topic_set(&self) -> TopicSet {
        if self.no_topics {
            TopicSet::default()
        } else if self.topics.is_empty() {
            TopicSet::default_selection()
        } else {
            TopicSet::from_topics(&self.topics)
        }
    }

    fn read_input(&self) -> Result<String> {
        match &self.input {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read stdin")?;
                Ok(buf)
            }
        }
    }
}

/// `RUST_LOG` wins when set and valid, otherwise this crate logs at info.
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|spec| !spec.trim().is_empty())
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(
            std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        ))
        .init();

    let device = cli.cuda.map(DeviceRequest::Cuda).unwrap_or_default();
    let registry = Arc::new(PipelineRegistry::with_loader(
        cli.pipeline_config()?,
        Arc::new(HubLoader::new(device)),
    ));

    // Models load once, up front, so the first analysis is not the slow one.
    let warm = Arc::clone(&registry);
    if let Err(e) = tokio::task::spawn_blocking(move || warm.warm_up()).await? {
        print_error(&e);
        std::process::exit(1);
    }

    let options = AnalysisOptions {
        max_chars: cli.max_chars,
        timeout: cli.timeout_secs.map(Duration::from_secs),
        ..AnalysisOptions::default()
    };
    let facade = AnalysisFacade::with_options(registry, options);

    let raw = cli.read_input()?;
    match facade.run(&raw, &cli.topic_set()).await {
        Ok(report) => render(&report),
        Err(e) => {
            print_error(&e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn render(report: &AnalysisReport) {
    println!("\n{}", "Sentiment".bold().underline());
    match &report.sentiment {
        Ok(verdict) => println!(
            "  {} {}",
            verdict.label.bold(),
            format!("(confidence {:.2})", verdict.score).dimmed()
        ),
        Err(e) => print_view_error(e),
    }

    println!("\n{}", "Topic focus".bold().underline());
    match &report.topics {
        Ok(TopicFocus::Ranked(scores)) => {
            for s in scores {
                println!("  {:<14} {:.3}", s.label, s.score);
            }
        }
        Ok(focus @ TopicFocus::NoTopicsSelected) => {
            if let Some(warning) = focus.warning() {
                println!("  {} {}", "WARNING:".yellow().bold(), warning);
            }
        }
        Err(e) => print_view_error(e),
    }

    println!("\n{}", "Summary".bold().underline());
    match &report.summary {
        Ok(summary) => println!("  {}", summary.text),
        Err(e) => print_view_error(e),
    }
    println!();
}

fn print_view_error(e: &AnalysisError) {
    println!("  {} {}", "Error:".red().bold(), e.user_message());
    if let Some(detail) = e.detail() {
        println!("  {}", detail.dimmed());
    }
}

fn print_error(e: &AnalysisError) {
    eprintln!("{} {}", "Error:".red().bold(), e.user_message());
    if let Some(detail) = e.detail() {
        eprintln!("  {}", detail.dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_log_env_uses_crate_info() {
        assert_eq!(env_filter(None).to_string(), DEFAULT_LOG_DIRECTIVE);
        assert_eq!(env_filter(Some("  ")).to_string(), DEFAULT_LOG_DIRECTIVE);
    }

    #[test]
    fn log_env_overrides_the_default_level() {
        let filter = env_filter(Some("earnings_lens=debug")).to_string();
        assert!(filter.contains("earnings_lens=debug"), "got {filter}");
        assert!(!filter.contains("earnings_lens=info"), "got {filter}");
    }

    #[test]
    fn invalid_log_env_falls_back() {
        let filter = env_filter(Some("earnings_lens=loud")).to_string();
        assert_eq!(filter, DEFAULT_LOG_DIRECTIVE);
    }
}
