mod cli;
mod output;
mod serpapi;
mod tree;

pub const USER_AGENT: &str = concat!("paa-tree/", env!("CARGO_PKG_VERSION"));

use std::io::{self, IsTerminal};
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use reqwest::Client;
use tracing::{error, info};

use cli::{Args, OutlineTarget};
use serpapi::SerpApiClient;
use tree::BuildError;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Per-request timeout covering connect + response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("paa_tree=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let query = args.query_text();
    if query.is_empty() {
        return Err(BuildError::EmptyQuery.into());
    }

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()?;
    let client = SerpApiClient::from_env(http)
        .inspect_err(|e| error!("cannot start: {e}"))?
        .with_locale(args.locale());

    if args.needs_confirmation() && io::stdin().is_terminal() {
        let prompt = format!(
            "Depth {} may use up to {} SerpApi searches. Continue?",
            args.depth,
            cli::worst_case_calls(args.depth)
        );
        if !cli::confirm(&prompt, io::stdin().lock(), io::stderr())? {
            info!("aborted by user");
            return Ok(());
        }
    }

    let result = tree::build_tree(&client, &query, args.depth, args.fresh)
        .await
        .inspect_err(|e| error!("{e}"))?;

    let stats = result.stats();
    info!(
        roots = result.questions.len(),
        nodes = stats.nodes,
        max_depth = stats.max_depth,
        failed = stats.failed,
        "question tree complete"
    );

    if args.stdout {
        println!("{}", output::to_json(&result)?);
    } else {
        let path = output::write_json(&result, &args.out_dir, Local::now().naive_local())?;
        info!(path = %path.display(), "result saved");
    }

    match args.outline_target() {
        Some(OutlineTarget::Stdout) => print!("{}", tree::format::format_outline(&result)),
        Some(OutlineTarget::Stderr) => eprint!("{}", tree::format::format_outline(&result)),
        None => {}
    }

    Ok(())
}
