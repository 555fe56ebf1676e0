//! docsift command-line entry point.

mod cli;

use anyhow::Context;
use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use cli::display::{render_report, Style};
use cli::progress::ProgressObserver;
use cli::Args;
use docsift::prelude::*;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if args.keyword.trim().is_empty() {
        eprintln!("Please enter a search keyword");
        return ExitCode::SUCCESS;
    }

    let config = match args.load_config().context("invalid configuration") {
        Ok(config) => config,
        Err(e) => return failure(&e),
    };
    init_tracing(config.verbose, args.log_json);

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => failure(&e),
    }
}

fn failure(error: &anyhow::Error) -> ExitCode {
    eprintln!("Error: {error:#}");
    ExitCode::FAILURE
}

async fn run(args: Args, config: DocsiftConfig) -> anyhow::Result<()> {
    let matcher = KeywordMatcher::new(&args.keyword, &config.search)?;

    let cancellation = Arc::new(CancellationToken::new());
    let observer = Arc::new(ProgressObserver::new(
        !args.json && std::io::stderr().is_terminal(),
    ));
    let pipeline = SearchPipeline::new(config)?
        .with_observer(observer)
        .with_cancellation(Arc::clone(&cancellation));

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancellation.cancel("interrupted");
        }
    });

    let report = pipeline
        .search(&args.keyword)
        .await
        .context("search failed")?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        let style = Style::new(std::io::stdout().is_terminal());
        print!("{}", render_report(&report, &matcher, style));
    }
    Ok(())
}
