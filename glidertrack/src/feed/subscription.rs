//! Keeps the feed filter in step with the tracked set.

use std::sync::Arc;

use super::client::FeedClient;
use crate::tracking::TrackingStore;

/// Prefix of an APRS-IS buddy-list filter.
pub const BUDDY_FILTER_PREFIX: &str = "b/";

/// Build the buddy-list filter for a set of canonical ids.
///
/// Ids are sorted so the same set always yields the same filter. An empty
/// set yields an empty filter (no targeted subscription).
pub fn build_filter<S: AsRef<str>>(ids: &[S]) -> String {
    if ids.is_empty() {
        return String::new();
    }
    let mut sorted: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();
    format!("{}{}", BUDDY_FILTER_PREFIX, sorted.join("/"))
}

/// Pushes filter changes to the feed client.
///
/// The manager never owns the connection: while tracking is enabled it
/// only asks the client to disconnect, and the ingestion loop reconnects
/// with the new filter.
pub struct SubscriptionManager<F: FeedClient> {
    client: Arc<F>,
}

impl<F: FeedClient> SubscriptionManager<F> {
    pub fn new(client: Arc<F>) -> Self {
        Self { client }
    }

    /// Recompute the filter from the store and hand it to the client without
    /// touching the connection. Returns the filter.
    pub fn sync_filter(&self, store: &TrackingStore) -> String {
        let filter = build_filter(&store.ids());
        if self.client.filter() != filter {
            tracing::debug!(filter = %filter, "Feed filter updated");
            self.client.set_filter(filter.clone());
        }
        filter
    }

    /// Recompute and apply the filter; while tracking is enabled, restart the
    /// connection so it takes effect. Returns the filter.
    pub fn refresh(&self, store: &TrackingStore) -> String {
        let filter = self.sync_filter(store);
        if store.is_enabled() {
            tracing::debug!(filter = %filter, "Restarting feed with new filter");
            self.client.disconnect();
        }
        filter
    }
}
