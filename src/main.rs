use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use usermine::{init_tracing_once, Sources, UserMine};

#[derive(Parser, Debug)]
#[command(
    name = "usermine",
    version,
    about = "Mine a user's Reddit/Twitter comments for entities and topics"
)]
struct Args {
    /// Username to investigate
    #[arg(short = 'u', long = "user")]
    user: String,

    /// OpenCalais API key
    #[arg(short = 'a', long = "api-key", env = "CALAIS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Database file (default is "usermine-<username>.db")
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Display debug information during processing
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Fetch comments from Reddit
    #[arg(short = 'r', long = "reddit")]
    reddit: bool,

    /// Fetch comments from Twitter
    #[arg(short = 't', long = "twitter")]
    twitter: bool,

    /// Display output as human-readable text instead of JSON
    #[arg(short = 'o', long = "human-readable")]
    human_readable: bool,

    /// Only summarize an existing database; no fetching or annotation
    #[arg(long)]
    summary_only: bool,

    /// Show a progress bar while annotating
    #[arg(long)]
    progress: bool,

    /// HTTP timeout for feeds and the annotation service
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

fn usage_error(msg: &str) -> ! {
    Args::command()
        .error(clap::error::ErrorKind::MissingRequiredArgument, msg)
        .exit()
}

fn run(args: &Args) -> Result<()> {
    let mut mine = UserMine::new()
        .username(&args.user)
        .sources(Sources { reddit: args.reddit, twitter: args.twitter })
        .summary_only(args.summary_only)
        .progress(args.progress)
        .timeout(Duration::from_secs(args.timeout_secs));
    if let Some(key) = &args.api_key {
        mine = mine.api_key(key);
    }
    if let Some(file) = &args.file {
        mine = mine.db_path(file);
    }

    let report = mine.run()?;
    tracing::debug!("Store: {}", report.db_path.display());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.human_readable {
        report.summary.write_human(&mut out)?;
    } else {
        report.summary.write_json(&mut out, false)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if !args.summary_only {
        if args.api_key.as_deref().map_or(true, str::is_empty) {
            usage_error("API key is required (-a or CALAIS_API_KEY)");
        }
        if !args.reddit && !args.twitter {
            usage_error("You must specify at least one service, Reddit (-r) or Twitter (-t), to pull comments from");
        }
    }

    init_tracing_once(if args.debug { "debug" } else { "info" });

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("run failed: {:?}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
