use anyhow::Context;
use chat_cli::cli::Cli;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    chat_cli::logging::init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    let result = runtime.block_on(chat_cli::run(cli));
    // Pending blocking work (a DNS lookup mid-reconnect) must not delay exit.
    runtime.shutdown_background();
    result
}
