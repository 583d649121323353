//! Tracker coordinator.
//!
//! Ties the tracking store to its collaborators: every command-level
//! operation mutates the store, keeps the feed filter in step with the
//! tracked set, and starts or stops the background tasks.
//!
//! ```text
//!                 ┌──────────────┐
//!  commands ────► │   Tracker    │──── refresh ───► SubscriptionManager ──► FeedClient
//!                 └──────┬───────┘
//!                        │ enable: spawn
//!             ┌──────────┴───────────┐
//!             ▼                      ▼
//!       IngestionLoop          BroadcastCycle ───► ChatTransport
//!             │                      ▲
//!             └──► TrackingStore ────┘
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::broadcast::{BroadcastConfig, BroadcastCycle};
use crate::chat::{ChatId, ChatTransport};
use crate::coord::Coordinates;
use crate::feed::{
    BeaconDecoder, FeedClient, IngestionLoop, SubscriptionManager,
    DEFAULT_RECONNECT_BACKOFF_SECS,
};
use crate::tracking::{AddOutcome, EnableOutcome, OutboundHandles, ResetOutcome, TrackingStore};

/// Default window for accepting a landing location.
pub const DEFAULT_LANDING_CAPTURE_SECS: u64 = 120;

/// Runtime settings for the [`Tracker`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Broadcast cycle settings.
    pub broadcast: BroadcastConfig,
    /// Wait between feed reconnect attempts.
    pub reconnect_backoff: Duration,
    /// How long `/landing` waits for a location.
    pub landing_capture_window: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            broadcast: BroadcastConfig::default(),
            reconnect_backoff: Duration::from_secs(DEFAULT_RECONNECT_BACKOFF_SECS),
            landing_capture_window: Duration::from_secs(DEFAULT_LANDING_CAPTURE_SECS),
        }
    }
}

/// Background tasks of one enabled period.
struct RunningTasks {
    ingest: JoinHandle<()>,
    broadcast: JoinHandle<()>,
}

impl RunningTasks {
    fn is_finished(&self) -> bool {
        self.ingest.is_finished() && self.broadcast.is_finished()
    }

    fn abort(&self) {
        self.ingest.abort();
        self.broadcast.abort();
    }
}

/// Coordinates the store, the feed and the broadcaster.
pub struct Tracker<F, D, T>
where
    F: FeedClient,
    D: BeaconDecoder,
    T: ChatTransport,
{
    store: Arc<TrackingStore>,
    subscription: SubscriptionManager<F>,
    feed: Arc<F>,
    decoder: Arc<D>,
    transport: Arc<T>,
    config: TrackerConfig,
    tasks: Mutex<Option<RunningTasks>>,
}

impl<F, D, T> Tracker<F, D, T>
where
    F: FeedClient + 'static,
    D: BeaconDecoder + 'static,
    T: ChatTransport + 'static,
{
    /// Create a tracker around a fresh, empty store.
    pub fn new(feed: Arc<F>, decoder: Arc<D>, transport: Arc<T>, config: TrackerConfig) -> Self {
        Self::with_store(Arc::new(TrackingStore::new()), feed, decoder, transport, config)
    }

    /// Create a tracker around an existing store.
    pub fn with_store(
        store: Arc<TrackingStore>,
        feed: Arc<F>,
        decoder: Arc<D>,
        transport: Arc<T>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            store,
            subscription: SubscriptionManager::new(Arc::clone(&feed)),
            feed,
            decoder,
            transport,
            config,
            tasks: Mutex::new(None),
        }
    }

    /// Shared tracking store.
    pub fn store(&self) -> &Arc<TrackingStore> {
        &self.store
    }

    /// Chat transport used for broadcasts and acknowledgments.
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Track an identifier (or relabel it).
    pub fn add(
        &self,
        raw_id: &str,
        display_name: Option<String>,
        attribution_name: Option<String>,
    ) -> AddOutcome {
        let outcome = self.store.add(raw_id, display_name, attribution_name);
        if outcome.inserted {
            self.subscription.refresh(&self.store);
        }
        tracing::info!(id = %outcome.id, inserted = outcome.inserted, "Tracking id added");
        outcome
    }

    /// Stop tracking an identifier. Returns the canonical id and whether it
    /// was tracked. The entry's marker and detail text are deleted from the
    /// chat in the background.
    pub fn remove(&self, raw_id: &str) -> (String, bool) {
        let chat = self.store.chat_target();
        let (id, entry) = self.store.remove_entry(raw_id);
        let Some(entry) = entry else {
            return (id, false);
        };

        self.subscription.refresh(&self.store);
        self.retire(chat, entry.outbound.into_iter().collect());
        tracing::info!(id = %id, "Tracking id removed");
        (id, true)
    }

    /// Turn tracking on and start the ingestion and broadcast tasks.
    pub fn enable(&self, chat: ChatId) -> EnableOutcome {
        let outcome = self.store.set_enabled(true);
        if outcome != EnableOutcome::Enabled {
            return outcome;
        }

        self.store.set_chat_target(chat);
        self.subscription.sync_filter(&self.store);

        let ingest = IngestionLoop::new(
            Arc::clone(&self.store),
            Arc::clone(&self.feed),
            Arc::clone(&self.decoder),
            self.config.reconnect_backoff,
        )
        .start();
        let broadcast = BroadcastCycle::new(
            Arc::clone(&self.store),
            Arc::clone(&self.transport),
            self.config.broadcast.clone(),
        )
        .start();

        let previous = self.tasks.lock().replace(RunningTasks { ingest, broadcast });
        if let Some(previous) = previous.filter(|t| !t.is_finished()) {
            // Left over from a quick off/on; would otherwise run twice
            tracing::debug!("Aborting tasks from previous tracking period");
            previous.abort();
        }

        tracing::info!(chat = %chat, tracked = self.store.len(), "Tracking enabled");
        outcome
    }

    /// Turn tracking off. The feed connection is released before this
    /// returns; the background tasks exit on their own shortly after.
    pub fn disable(&self) -> EnableOutcome {
        let outcome = self.store.set_enabled(false);
        if outcome == EnableOutcome::Disabled {
            self.feed.disconnect();
            tracing::info!("Tracking disabled");
        }
        outcome
    }

    /// Returns true while tracking is on.
    pub fn is_enabled(&self) -> bool {
        self.store.is_enabled()
    }

    /// Start or restart the session. Restarting drops every entry and,
    /// if tracking was on, releases the feed.
    pub fn reset_session(&self, chat: ChatId) -> ResetOutcome {
        let previous_chat = self.store.chat_target();
        let outcome = self.store.reset_session();
        self.store.set_chat_target(chat);
        if outcome.tracking_was_enabled {
            self.feed.disconnect();
        }
        self.subscription.refresh(&self.store);
        self.retire(previous_chat, outcome.retired.clone());
        outcome
    }

    /// Leave the session (welcome command). Entries are kept.
    pub fn end_session(&self, chat: ChatId) {
        self.store.set_chat_target(chat);
        self.store.end_session();
    }

    /// Open the landing capture window.
    pub fn arm_landing_capture(&self, chat: ChatId) -> Duration {
        let window = self.config.landing_capture_window;
        self.store.set_chat_target(chat);
        self.store.arm_landing_capture(Instant::now(), window);
        window
    }

    /// Close the landing capture window.
    pub fn disarm_landing_capture(&self) {
        self.store.disarm_landing_capture();
    }

    /// Offer a location for the landing reference.
    pub fn offer_landing_location(&self, location: Coordinates) -> bool {
        self.store.offer_landing_location(location, Instant::now())
    }

    /// Remember where outward messages go.
    pub fn set_chat_target(&self, chat: ChatId) {
        self.store.set_chat_target(chat);
    }

    /// Delete the message pairs of dropped entries without blocking the
    /// caller. Failures are logged only; expired markers often refuse.
    fn retire(&self, chat: Option<ChatId>, pairs: Vec<OutboundHandles>) {
        let Some(chat) = chat else {
            return;
        };
        if pairs.is_empty() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(count = pairs.len(), "No runtime, leaving old messages in place");
            return;
        };

        let transport = Arc::clone(&self.transport);
        runtime.spawn(async move {
            let handles = pairs
                .iter()
                .flat_map(|pair| std::iter::once(pair.live).chain(pair.detail));
            for handle in handles {
                if let Err(e) = transport.delete_message(chat, handle).await {
                    tracing::debug!(handle = %handle, error = %e, "Failed to delete retired message");
                }
            }
        });
    }
}
