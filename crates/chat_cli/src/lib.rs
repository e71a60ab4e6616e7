//! Terminal front-end for `session_chat`.
//!
//! Resolves the session from the address (creating one when the address has
//! no `#<id>` fragment), then runs a single-threaded loop: stdin lines become
//! submissions, channel events go through `ChannelManager`, and the view
//! prints transcript deltas plus `[status]` lines on stdout. Diagnostics go to
//! stderr through `tracing`.

use std::fs::File;
use std::io;

use anyhow::Context;
use chat_api::{parse_base_url, ChatApiClient, WebSocketHost};
use session_chat::{ChannelManager, SessionAddress, SessionResolver};

pub mod cli;
pub mod commands;
pub mod logging;
pub mod runtime;
pub mod view;

use crate::cli::Cli;
use crate::runtime::{stdin_lines, ChatRuntime};
use crate::view::TerminalView;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.api_config();
    let mut address = SessionAddress::new(parse_base_url(&cli.address)?);
    let client = ChatApiClient::new(config.clone()).context("configuring session client")?;

    let session_id = SessionResolver::new(&client)
        .resolve(&mut address)
        .await
        .context("creating session")?;

    let channels = WebSocketHost::from_config(&config)?;
    let manager = ChannelManager::with_log_capacity(session_id, cli.log_capacity);
    let mut runtime = ChatRuntime::new(manager, channels, address, TerminalView::new(io::stdout()));
    if let Some(path) = &cli.log_file {
        let file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        runtime = runtime.with_log_file(file);
    }

    runtime.run(stdin_lines().context("starting stdin reader")?).await
}
