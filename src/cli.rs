//! Command-line interface definitions for intel_briefing.
//!
//! Global options (config file, log level, LLM credentials) apply to every
//! subcommand. Credentials may also come from the environment or a `.env`
//! file.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Multi-source intelligence briefing generator.
///
/// # Examples
///
/// ```sh
/// # Today's briefing into reports/daily_briefings/
/// intel_briefing run
///
/// # A seven-day briefing, also dumping the raw bundle
/// intel_briefing run --days 7 --json ./bundle.json
///
/// # Just look at a couple of sources
/// intel_briefing fetch --source hackernews,v2ex --keyword rust
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// API key for the OpenAI-compatible chat endpoint (enables social search)
    #[arg(long, env = "XAI_API_KEY", global = true, hide_env_values = true)]
    pub xai_api_key: Option<String>,

    /// Chat-completions URL override
    #[arg(long, env = "XAI_BASE_URL", global = true)]
    pub xai_base_url: Option<String>,

    /// Model name override
    #[arg(long, env = "XAI_MODEL", global = true)]
    pub xai_model: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect every source and write the Markdown briefing (default)
    Run(RunArgs),
    /// Fetch selected sources and print them as JSON
    Fetch(FetchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Items per source (defaults to 10, or 30 for multi-day briefings)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Quick run: one item per source, report written as Morning_Report_TEST.md
    #[arg(long)]
    pub test: bool,

    /// Report path (defaults to reports/daily_briefings/<name>.md)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of days the briefing covers
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub days: u32,

    /// Also write the raw bundle as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            limit: None,
            test: false,
            output: None,
            days: 1,
            json: None,
        }
    }
}

impl RunArgs {
    pub fn effective_limit(&self) -> usize {
        if self.test {
            1
        } else {
            self.limit.unwrap_or(if self.days > 1 { 30 } else { 10 })
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// `all` or a comma-separated list of source keys
    #[arg(short, long, default_value = "all")]
    pub source: String,

    /// Items per source
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Comma-separated whole-word filter applied to titles
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Download each item's page and attach its text
    #[arg(long)]
    pub deep: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults() {
        let cli = Cli::parse_from(["intel_briefing"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "info");
        assert_eq!(RunArgs::default().effective_limit(), 10);
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::parse_from([
            "intel_briefing",
            "run",
            "--days",
            "7",
            "--json",
            "/tmp/bundle.json",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.log_level, "debug");
        let Some(Command::Run(run)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(run.days, 7);
        assert_eq!(run.effective_limit(), 30);
        assert_eq!(run.json, Some(PathBuf::from("/tmp/bundle.json")));
    }

    #[test]
    fn test_test_mode_wins_over_limit() {
        let cli = Cli::parse_from(["intel_briefing", "run", "--test", "-l", "25"]);
        let Some(Command::Run(run)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(run.effective_limit(), 1);
    }

    #[test]
    fn test_fetch_short_flags() {
        let cli = Cli::parse_from([
            "intel_briefing",
            "fetch",
            "-s",
            "hackernews,v2ex",
            "-l",
            "5",
            "-k",
            "rust",
            "--deep",
        ]);
        let Some(Command::Fetch(fetch)) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(fetch.source, "hackernews,v2ex");
        assert_eq!(fetch.limit, 5);
        assert_eq!(fetch.keyword.as_deref(), Some("rust"));
        assert!(fetch.deep);
    }

    #[test]
    fn test_zero_days_rejected() {
        assert!(Cli::try_parse_from(["intel_briefing", "run", "--days", "0"]).is_err());
    }
}
