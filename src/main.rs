// src/main.rs
use std::env;
use std::process;

use chrono::{Duration, Utc};
use clap::Parser;
use log::error;

use stale_flags::report::{self, ReportFormat, ReportOptions};
use stale_flags::{Client, FlagError, PIPELINE_DEADLINE};

/// Report stale feature flags for a project/environment, grouped by
/// maintainer and activity status.
#[derive(Debug, Parser)]
#[command(name = "stale-flags", version)]
struct Cli {
    /// Project to check.
    #[arg(long, default_value = "default")]
    project: String,

    /// Environment to check.
    #[arg(long, default_value = "production")]
    env: String,

    /// Name of the environment variable holding the API token.
    #[arg(long, default_value = "LAUNCH_DARKLY_API_TOKEN")]
    token: String,

    /// Staleness threshold in days for creation, last-modified and
    /// last-requested checks (half a year by default).
    #[arg(long, default_value_t = 180)]
    threshold: i64,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    format: ReportFormat,

    /// Show permanent flags as well.
    #[arg(long)]
    with_permanent: bool,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let api_key = env::var(&cli.token).unwrap_or_default();
    let client = Client::builder().with_api_key(&api_key).build();

    let flags = match tokio::time::timeout(
        PIPELINE_DEADLINE,
        client.get_flags(&cli.project, &cli.env),
    )
    .await
    {
        Err(_) => fatal(FlagError::DeadlineExceeded),
        Ok(Err(e)) => fatal(e),
        Ok(Ok(flags)) => flags,
    };

    let opts = ReportOptions {
        host: client.base_url().to_string(),
        project: cli.project,
        env: cli.env,
        threshold: Duration::days(cli.threshold),
        now: Utc::now(),
        with_permanent: cli.with_permanent,
        format: cli.format,
    };

    let mut flags = report::filter_flags(flags, &opts);
    report::sort_flags(&mut flags, &opts);
    print!("{}", report::render(&flags, &opts));
}

fn fatal(err: FlagError) -> ! {
    error!("failed to get flags: {}", err);
    process::exit(1);
}
