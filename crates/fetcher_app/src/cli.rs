//! Command-line arguments and URL collection.

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fetcher_logging::{LogDestination, TerminalStream, DEFAULT_LOG_FILE};
use log::LevelFilter;

/// Fetch images from URLs into a local folder, skipping ones already saved.
#[derive(Debug, Parser)]
#[command(name = "image_fetcher")]
#[command(about = "Fetch images from URLs, skipping duplicates", long_about = None)]
pub struct Cli {
    /// Image URLs to fetch, in order. Read from stdin when none are given.
    pub urls: Vec<String>,

    /// Read URLs from a file, one per line (`#` starts a comment).
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Directory images are saved into (overrides the config file).
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// RON config file; `image_fetcher.ron` is used if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Print one JSON record per outcome instead of the console report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Cli {
    pub fn log_destination(&self) -> LogDestination {
        match self.log {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File(PathBuf::from(DEFAULT_LOG_FILE)),
            LogTarget::Both => LogDestination::Both(PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }

    /// Terminal logs go to stderr in JSON mode so stdout carries only records.
    pub fn log_stream(&self) -> TerminalStream {
        if self.json {
            TerminalStream::Stderr
        } else {
            TerminalStream::Mixed
        }
    }
}

/// URLs from the arguments and `--file`, or from `stdin` when neither has any.
///
/// Stdin is read until EOF or the first empty line.
pub fn collect_urls(cli: &Cli, stdin: impl BufRead) -> Result<Vec<String>> {
    let mut urls: Vec<String> = cli
        .urls
        .iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect();

    if let Some(path) = &cli.file {
        let content =
            fs::read_to_string(path).with_context(|| format!("could not read {:?}", path))?;
        urls.extend(parse_url_list(&content));
    }

    if urls.is_empty() && cli.file.is_none() {
        urls = read_until_blank(stdin).context("could not read URLs from stdin")?;
    }
    Ok(urls)
}

fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn read_until_blank(stdin: impl BufRead) -> io::Result<Vec<String>> {
    let mut urls = Vec::new();
    for line in stdin.lines() {
        let line = line?;
        let url = line.trim();
        if url.is_empty() {
            break;
        }
        urls.push(url.to_string());
    }
    Ok(urls)
}
