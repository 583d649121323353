//! Integration tests for the tracking relay.
//!
//! These tests drive the public API end to end with in-memory mocks of the
//! feed connection and the chat transport:
//! - commands arriving through the dispatcher
//! - APRS lines folded into the store
//! - broadcast ticks producing live markers and detail texts
//! - session reset and tracking shutdown

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use glidertrack::bot::{run_intake, CommandDispatcher, LANDING_SAVED_TEXT};
use glidertrack::broadcast::{BroadcastConfig, BroadcastCycle, HandlePolicy};
use glidertrack::chat::{
    ChatId, ChatTransport, InboundContent, InboundMessage, MessageHandle, Sender,
    TransportError, UpdateSource,
};
use glidertrack::coord::{distance_km, Coordinates};
use glidertrack::feed::{ingest_line, AprsDecoder, FeedClient, FeedError};
use glidertrack::tracker::{Tracker, TrackerConfig};

// =============================================================================
// Test Helpers
// =============================================================================

const CHAT: ChatId = ChatId(42);

const DEF123_LINE: &str =
    "FLRDEF123>APRS,qAS,LSGB:/120000h4630.00N/00636.00E'090/054/A=003281 !W00! id06DEF123";

/// Feed that blocks in `run` until disconnected.
#[derive(Default)]
struct IdleFeed {
    filter: Mutex<String>,
    stop: Notify,
    disconnects: AtomicUsize,
}

impl FeedClient for IdleFeed {
    fn set_filter(&self, filter: String) {
        *self.filter.lock() = filter;
    }

    fn filter(&self) -> String {
        self.filter.lock().clone()
    }

    async fn run<C>(&self, _on_line: C) -> Result<(), FeedError>
    where
        C: FnMut(&str) + Send,
    {
        self.stop.notified().await;
        Ok(())
    }

    fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.stop.notify_one();
    }
}

/// A call made on the recording transport.
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Text(String),
    EditText(MessageHandle, String),
    Live(Coordinates),
    EditLive(MessageHandle, Coordinates),
    Delete(MessageHandle),
}

/// Transport that records every call and hands out increasing handles.
#[derive(Default)]
struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    next_handle: AtomicI64,
}

impl RecordingTransport {
    fn handle(&self) -> MessageHandle {
        MessageHandle(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn clear(&self) {
        self.calls.lock().clear();
    }

    /// Detail texts sent or edited, in order.
    fn detail_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Text(t) | Call::EditText(_, t) if t.starts_with("Address:") => Some(t),
                _ => None,
            })
            .collect()
    }
}

impl ChatTransport for RecordingTransport {
    async fn send_text(&self, _: ChatId, text: &str) -> Result<MessageHandle, TransportError> {
        self.calls.lock().push(Call::Text(text.to_string()));
        Ok(self.handle())
    }

    async fn edit_text(
        &self,
        _: ChatId,
        handle: MessageHandle,
        text: &str,
    ) -> Result<(), TransportError> {
        self.calls.lock().push(Call::EditText(handle, text.to_string()));
        Ok(())
    }

    async fn send_live_location(
        &self,
        _: ChatId,
        position: Coordinates,
        _: Duration,
    ) -> Result<MessageHandle, TransportError> {
        self.calls.lock().push(Call::Live(position));
        Ok(self.handle())
    }

    async fn edit_live_location(
        &self,
        _: ChatId,
        handle: MessageHandle,
        position: Coordinates,
    ) -> Result<(), TransportError> {
        self.calls.lock().push(Call::EditLive(handle, position));
        Ok(())
    }

    async fn delete_message(&self, _: ChatId, handle: MessageHandle) -> Result<(), TransportError> {
        self.calls.lock().push(Call::Delete(handle));
        Ok(())
    }
}

/// Update source that yields one scripted batch, then cancels the intake.
struct ScriptedUpdates {
    batch: Mutex<Option<Vec<InboundMessage>>>,
    done: CancellationToken,
}

impl UpdateSource for ScriptedUpdates {
    async fn next_updates(&self) -> Result<Vec<InboundMessage>, TransportError> {
        match self.batch.lock().take() {
            Some(batch) => Ok(batch),
            None => {
                self.done.cancel();
                Ok(Vec::new())
            }
        }
    }
}

type TestTracker = Tracker<IdleFeed, AprsDecoder, RecordingTransport>;

struct Harness {
    dispatcher: CommandDispatcher<IdleFeed, AprsDecoder, RecordingTransport>,
    feed: Arc<IdleFeed>,
    transport: Arc<RecordingTransport>,
}

impl Harness {
    fn new(policy: HandlePolicy) -> Self {
        let feed = Arc::new(IdleFeed::default());
        let transport = Arc::new(RecordingTransport::default());
        let config = TrackerConfig {
            broadcast: BroadcastConfig {
                policy,
                ..BroadcastConfig::default()
            },
            ..TrackerConfig::default()
        };
        let tracker = Arc::new(Tracker::new(
            Arc::clone(&feed),
            Arc::new(AprsDecoder::new()),
            Arc::clone(&transport),
            config,
        ));
        Self {
            dispatcher: CommandDispatcher::new(tracker),
            feed,
            transport,
        }
    }

    fn tracker(&self) -> &Arc<TestTracker> {
        self.dispatcher.tracker()
    }

    async fn say(&self, text: &str) -> Option<String> {
        self.dispatcher.handle(text_message(text)).await
    }

    fn feed_line(&self, line: &str) -> bool {
        ingest_line(self.tracker().store(), &AprsDecoder::new(), line)
    }

    fn cycle(&self) -> BroadcastCycle<RecordingTransport> {
        BroadcastCycle::new(
            Arc::clone(self.tracker().store()),
            Arc::clone(&self.transport),
            self.tracker().config().broadcast.clone(),
        )
    }
}

/// Deletes for dropped entries run on a spawned task.
async fn wait_for_deletes(transport: &RecordingTransport, count: usize) {
    let deleted = || {
        transport
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Delete(_)))
            .count()
    };
    tokio::time::timeout(Duration::from_secs(2), async {
        while deleted() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("retired messages were not deleted");
}

fn alice() -> Sender {
    Sender {
        user_id: 7,
        username: Some("alice".to_string()),
        first_name: "Alice".to_string(),
        last_name: None,
    }
}

fn text_message(text: &str) -> InboundMessage {
    InboundMessage {
        chat: CHAT,
        sender: Some(alice()),
        content: InboundContent::Text(text.to_string()),
    }
}

fn location_message(latitude: f64, longitude: f64) -> InboundMessage {
    InboundMessage {
        chat: CHAT,
        sender: Some(alice()),
        content: InboundContent::Location(Coordinates::new(latitude, longitude)),
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[tokio::test]
async fn test_add_fold_broadcast_without_landing() {
    let h = Harness::new(HandlePolicy::Edit);

    h.say("/start_session").await;
    assert_eq!(h.say("/add flarmDEF123 Glider1").await.as_deref(), Some("Added DEF123"));
    assert_eq!(h.tracker().store().ids(), vec!["DEF123".to_string()]);
    assert_eq!(h.feed.filter(), "b/DEF123");

    assert!(h.feed_line(DEF123_LINE));
    let entry = h.tracker().store().entry("def123").unwrap();
    let beacon = entry.last_position.unwrap();
    assert_eq!(beacon.position, Coordinates::new(46.5, 6.6));

    h.transport.clear();
    let report = h.cycle().run_once().await;
    assert_eq!(report.created, 1);

    let calls = h.transport.calls();
    assert_eq!(calls[0], Call::Live(Coordinates::new(46.5, 6.6)));

    let texts = h.transport.detail_texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Address: DEF123"));
    assert!(texts[0].contains("Glider1 (alice)"));
    assert!(texts[0].contains("Last update"));
    assert!(!texts[0].contains("Distance to landing"));
}

#[tokio::test]
async fn test_landing_reference_adds_distance_line() {
    let h = Harness::new(HandlePolicy::Edit);
    h.say("/add flarmDEF123 Glider1").await;
    h.feed_line(DEF123_LINE);

    let reply = h.say("/landing").await.unwrap();
    assert!(reply.contains("2 minutes"));
    let saved = h.dispatcher.handle(location_message(46.0, 6.0)).await;
    assert_eq!(saved.as_deref(), Some(LANDING_SAVED_TEXT));

    h.transport.clear();
    h.cycle().run_once().await;

    let expected = format!(
        "Distance to landing: {:.1} km",
        distance_km(46.5, 6.6, 46.0, 6.0)
    );
    let texts = h.transport.detail_texts();
    assert!(texts[0].contains(&expected), "{}", texts[0]);
    assert!(texts[0].contains("72.2 km"));
}

#[tokio::test]
async fn test_location_without_capture_is_ignored() {
    let h = Harness::new(HandlePolicy::Edit);

    assert!(h.dispatcher.handle(location_message(46.0, 6.0)).await.is_none());

    // Any other command closes the window
    h.say("/landing").await;
    h.say("/list").await;
    assert!(h.dispatcher.handle(location_message(46.0, 6.0)).await.is_none());
    assert!(h.tracker().store().landing_reference().is_none());
}

#[tokio::test]
async fn test_removed_entry_is_not_resurrected() {
    let h = Harness::new(HandlePolicy::Edit);
    h.say("/add flarmDEF123 Glider1").await;

    assert_eq!(h.say("/remove DEF123").await.as_deref(), Some("Removed DEF123"));
    assert!(!h.feed_line(DEF123_LINE));
    assert!(h.tracker().store().is_empty());
    assert_eq!(h.feed.filter(), "");

    h.transport.clear();
    let report = h.cycle().run_once().await;
    assert_eq!(report, Default::default());
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn test_remove_deletes_broadcast_pair() {
    let h = Harness::new(HandlePolicy::Edit);
    h.say("/add DEF123").await;
    h.feed_line(DEF123_LINE);
    h.cycle().run_once().await;
    let pair = h.tracker().store().entry("DEF123").unwrap().outbound.unwrap();

    h.transport.clear();
    h.say("/remove DEF123").await;

    let expected = vec![Call::Delete(pair.live), Call::Delete(pair.detail.unwrap())];
    wait_for_deletes(&h.transport, expected.len()).await;
    let deletes: Vec<Call> = h
        .transport
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Delete(_)))
        .collect();
    assert_eq!(deletes, expected);
}

#[tokio::test]
async fn test_session_reset_deletes_broadcast_pairs() {
    let h = Harness::new(HandlePolicy::Edit);
    h.say("/start_session").await;
    h.say("/add DEF123").await;
    h.say("/add ABC456").await;
    h.feed_line(DEF123_LINE);
    h.cycle().run_once().await;
    let pair = h.tracker().store().entry("DEF123").unwrap().outbound.unwrap();

    h.transport.clear();
    h.say("/start_session").await;

    wait_for_deletes(&h.transport, 2).await;
    let calls = h.transport.calls();
    assert!(calls.contains(&Call::Delete(pair.live)));
    assert!(calls.contains(&Call::Delete(pair.detail.unwrap())));
}

#[tokio::test]
async fn test_second_tick_edits_in_place() {
    let h = Harness::new(HandlePolicy::Edit);
    h.say("/add DEF123").await;
    h.feed_line(DEF123_LINE);

    h.transport.clear();
    h.cycle().run_once().await;
    let first = h.tracker().store().entry("DEF123").unwrap().outbound.unwrap();

    h.feed_line("FLRDEF123>APRS:/120030h4631.00N/00636.00E'");
    let report = h.cycle().run_once().await;
    assert_eq!(report.updated, 1);

    let calls = h.transport.calls();
    assert!(calls.contains(&Call::EditLive(
        first.live,
        Coordinates::new(46.0 + 31.0 / 60.0, 6.6)
    )));
    assert_eq!(
        calls.iter().filter(|c| matches!(c, Call::Live(_))).count(),
        1,
        "edit policy must not re-send the marker"
    );
    assert_eq!(h.tracker().store().entry("DEF123").unwrap().outbound, Some(first));
}

#[tokio::test]
async fn test_replace_policy_deletes_and_resends() {
    let h = Harness::new(HandlePolicy::Replace);
    h.say("/add DEF123").await;
    h.feed_line(DEF123_LINE);

    h.cycle().run_once().await;
    let first = h.tracker().store().entry("DEF123").unwrap().outbound.unwrap();

    h.transport.clear();
    let report = h.cycle().run_once().await;
    assert_eq!(report.replaced, 1);

    let calls = h.transport.calls();
    assert!(calls.contains(&Call::Delete(first.live)));
    assert!(calls.iter().any(|c| matches!(c, Call::Live(_))));
    let second = h.tracker().store().entry("DEF123").unwrap().outbound.unwrap();
    assert_ne!(second.live, first.live);
}

#[tokio::test]
async fn test_track_on_off_lifecycle() {
    let h = Harness::new(HandlePolicy::Edit);

    assert_eq!(h.say("/track_on").await.as_deref(), Some("No addresses added"));
    h.say("/add DEF123").await;
    assert_eq!(h.say("/track_on").await.as_deref(), Some("Tracking enabled"));
    assert_eq!(h.say("/track_on").await.as_deref(), Some("Tracking already enabled"));
    assert!(h.tracker().is_enabled());
    assert_eq!(h.tracker().store().chat_target(), Some(CHAT));

    let list = h.say("/list").await.unwrap();
    assert!(list.starts_with("Tracking: on"));
    assert!(list.contains("DEF123 - alice"));

    assert_eq!(h.say("/track_off").await.as_deref(), Some("Tracking disabled"));
    assert!(!h.tracker().is_enabled());
    assert_eq!(h.feed.disconnects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_session_reset_while_enabled() {
    let h = Harness::new(HandlePolicy::Edit);
    h.say("/start_session").await;
    h.say("/add DEF123").await;
    h.say("/add ABC456").await;
    h.say("/track_on").await;

    h.say("/start_session").await;

    assert!(!h.tracker().is_enabled());
    assert!(h.tracker().store().is_empty());
    assert_eq!(h.feed.filter(), "");
    assert!(h.feed.disconnects.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn test_intake_dispatches_batch_in_order() {
    let h = Harness::new(HandlePolicy::Edit);
    let done = CancellationToken::new();
    let source = ScriptedUpdates {
        batch: Mutex::new(Some(vec![
            text_message("/add DEF123 One"),
            text_message("/add ABC456"),
            text_message("/remove DEF123"),
        ])),
        done: done.clone(),
    };

    tokio::time::timeout(
        Duration::from_secs(1),
        run_intake(&source, &h.dispatcher, done),
    )
    .await
    .unwrap();

    assert_eq!(h.tracker().store().ids(), vec!["ABC456".to_string()]);
    let replies: Vec<Call> = h.transport.calls();
    assert_eq!(
        replies,
        vec![
            Call::Text("Added DEF123".to_string()),
            Call::Text("Added ABC456".to_string()),
            Call::Text("Removed DEF123".to_string()),
        ]
    );
}
