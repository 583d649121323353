//! Run command - relay feed positions to Telegram until Ctrl+C.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use glidertrack::bot::{menu, run_intake, CommandDispatcher};
use glidertrack::chat::TelegramClient;
use glidertrack::config::ConfigFile;
use glidertrack::feed::{AprsClient, AprsDecoder};
use glidertrack::tracker::Tracker;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the run command.
#[derive(Debug, Default)]
pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub debug: bool,
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.config.as_deref(), args.debug)?;
    runner.log_startup("run");
    let config = runner.config();

    let token = config.bot_token().ok_or(CliError::MissingToken)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(serve(config, token))
}

/// Wire the components together and run command intake until Ctrl+C.
async fn serve(config: &ConfigFile, token: String) -> Result<(), CliError> {
    let client = Arc::new(TelegramClient::new(
        config.telegram.to_telegram_config(token),
    )?);

    if let Err(e) = client.set_my_commands(&menu()).await {
        tracing::warn!(error = %e, "Failed to register bot commands");
    }

    let feed = Arc::new(AprsClient::new(config.feed.to_feed_config()));
    let tracker = Arc::new(Tracker::new(
        feed,
        Arc::new(AprsDecoder::new()),
        Arc::clone(&client),
        config.to_tracker_config(),
    ));
    let dispatcher = CommandDispatcher::new(Arc::clone(&tracker));

    let cancellation = CancellationToken::new();
    let shutdown = cancellation.clone();
    ctrlc::set_handler(move || {
        tracing::info!("Shutdown requested");
        shutdown.cancel();
    })
    .map_err(|e| CliError::Signal(e.to_string()))?;

    println!("glidertrack v{}", glidertrack::VERSION);
    println!("Feed:     {}:{}", config.feed.server, config.feed.port);
    println!("Interval: {}s ({})", config.broadcast.interval, config.broadcast.policy);
    println!();
    println!("Press Ctrl+C to exit");

    run_intake(client.as_ref(), &dispatcher, cancellation).await;

    tracker.disable();
    tracing::info!("glidertrack stopped");
    Ok(())
}
