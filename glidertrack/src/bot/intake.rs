//! Command intake loop.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::dispatcher::CommandDispatcher;
use crate::chat::{ChatTransport, UpdateSource};
use crate::feed::{BeaconDecoder, FeedClient};

/// Wait before polling again after a failed fetch.
pub const INTAKE_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Fetch inbound messages and dispatch them in order until cancelled.
///
/// Fetch errors are logged and retried after [`INTAKE_RETRY_DELAY`].
pub async fn run_intake<U, F, D, T>(
    source: &U,
    dispatcher: &CommandDispatcher<F, D, T>,
    cancellation: CancellationToken,
) where
    U: UpdateSource,
    F: FeedClient + 'static,
    D: BeaconDecoder + 'static,
    T: ChatTransport + 'static,
{
    tracing::info!("Command intake started");

    loop {
        let batch = tokio::select! {
            _ = cancellation.cancelled() => break,
            batch = source.next_updates() => batch,
        };

        match batch {
            Ok(messages) => {
                for message in messages {
                    dispatcher.handle(message).await;
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    retry_secs = INTAKE_RETRY_DELAY.as_secs(),
                    "Failed to fetch updates"
                );
                tokio::select! {
                    _ = cancellation.cancelled() => break,
                    _ = tokio::time::sleep(INTAKE_RETRY_DELAY) => {}
                }
            }
        }
    }

    tracing::info!("Command intake stopped");
}
