//! Per-chat lanes.
//!
//! Every chat with traffic gets a lane: an unbounded mailbox drained by one
//! task. Events of one chat are therefore dispatched and answered strictly in
//! arrival order, while different chats run concurrently. A lane that stays
//! idle for the configured period removes itself; the next event for that
//! chat starts a fresh one.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use switchboard_core::{BoxedReplySink, ChatId, InboundEvent};
use switchboard_framework::ConversationDispatcher;
use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, trace, warn};

struct Lane {
    id: u64,
    tx: mpsc::UnboundedSender<InboundEvent>,
}

type LaneMap = Arc<Mutex<HashMap<ChatId, Lane>>>;

/// Routes events into per-chat lanes.
pub struct ChatLanes {
    dispatcher: Arc<ConversationDispatcher>,
    sink: BoxedReplySink,
    idle: Duration,
    lanes: LaneMap,
    next_id: AtomicU64,
    tracker: TaskTracker,
}

impl ChatLanes {
    /// Creates the lane set. Lanes exit after `idle` without events.
    pub fn new(dispatcher: Arc<ConversationDispatcher>, sink: BoxedReplySink, idle: Duration) -> Self {
        Self {
            dispatcher,
            sink,
            idle,
            lanes: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            tracker: TaskTracker::new(),
        }
    }

    /// Queues `event` on its chat's lane, starting the lane if needed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, event: InboundEvent) {
        let chat_id = event.chat_id();
        let mut lanes = self.lanes.lock();

        let event = match lanes.get(&chat_id) {
            Some(lane) => match lane.tx.send(event) {
                Ok(()) => return,
                // The worker is gone; take the event back and start over.
                Err(mpsc::error::SendError(event)) => event,
            },
            None => event,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        // The receiver is alive, so this cannot fail.
        let _ = tx.send(event);
        lanes.insert(chat_id, Lane { id, tx });
        drop(lanes);

        trace!(%chat_id, lane = id, "Starting chat lane");
        let worker = LaneWorker {
            chat_id,
            id,
            rx,
            idle: self.idle,
            lanes: Arc::clone(&self.lanes),
            dispatcher: Arc::clone(&self.dispatcher),
            sink: Arc::clone(&self.sink),
        };
        self.tracker
            .spawn(worker.run().instrument(tracing::debug_span!("lane", %chat_id)));
    }

    /// Number of live lanes.
    pub fn active(&self) -> usize {
        self.lanes.lock().len()
    }

    /// Stops accepting work and waits for every lane to drain its queue.
    pub async fn shutdown(&self) {
        let drained: Vec<Lane> = self.lanes.lock().drain().map(|(_, lane)| lane).collect();
        debug!(lanes = drained.len(), "Draining chat lanes");
        // Dropping the senders lets each worker finish its backlog and exit.
        drop(drained);
        self.tracker.close();
        self.tracker.wait().await;
    }
}

impl std::fmt::Debug for ChatLanes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatLanes")
            .field("active", &self.active())
            .field("idle", &self.idle)
            .finish()
    }
}

struct LaneWorker {
    chat_id: ChatId,
    id: u64,
    rx: mpsc::UnboundedReceiver<InboundEvent>,
    idle: Duration,
    lanes: LaneMap,
    dispatcher: Arc<ConversationDispatcher>,
    sink: BoxedReplySink,
}

impl LaneWorker {
    async fn run(mut self) {
        loop {
            match tokio::time::timeout(self.idle, self.rx.recv()).await {
                Ok(Some(event)) => self.handle(event).await,
                Ok(None) => break,
                Err(_) => {
                    let mut lanes = self.lanes.lock();
                    // Sends happen under this lock, so an empty queue here
                    // stays empty once the entry is gone.
                    if !self.rx.is_empty() {
                        continue;
                    }
                    if lanes.get(&self.chat_id).is_some_and(|lane| lane.id == self.id) {
                        lanes.remove(&self.chat_id);
                    }
                    trace!(chat_id = %self.chat_id, "Chat lane idle, exiting");
                    break;
                }
            }
        }
    }

    async fn handle(&self, event: InboundEvent) {
        let Some(result) = self.dispatcher.dispatch(event).await else {
            return;
        };
        if let Err(e) = self.sink.send(self.chat_id, &result.reply).await {
            warn!(chat_id = %self.chat_id, error = %e, "Failed to deliver reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use switchboard_core::{
        Capability, CapabilityResult, Intent, Reply, ReplySink, TransportResult,
    };
    use switchboard_framework::{CapabilityRegistry, SessionStore};

    /// Records every reply in delivery order.
    #[derive(Default)]
    struct MemorySink {
        sent: Mutex<Vec<(ChatId, String)>>,
    }

    impl MemorySink {
        fn for_chat(&self, chat: i64) -> Vec<String> {
            self.sent
                .lock()
                .iter()
                .filter(|(id, _)| id.get() == chat)
                .map(|(_, text)| text.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ReplySink for MemorySink {
        async fn send(&self, chat_id: ChatId, reply: &Reply) -> TransportResult<()> {
            self.sent.lock().push((chat_id, reply.text.clone()));
            Ok(())
        }
    }

    /// Sleeps for the number of milliseconds given as input.
    struct Slow;

    #[async_trait]
    impl Capability for Slow {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn handle(&self, input: &str) -> CapabilityResult<String> {
            let ms: u64 = input.trim().parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(format!("done {ms}"))
        }
    }

    fn setup(idle: Duration) -> (ChatLanes, Arc<MemorySink>) {
        let registry = CapabilityRegistry::builder()
            .intent(Intent::Analyze, Arc::new(Slow))
            .build();
        let dispatcher = Arc::new(ConversationDispatcher::new(
            registry,
            Arc::new(SessionStore::new()),
        ));
        let sink = Arc::new(MemorySink::default());
        let lanes = ChatLanes::new(dispatcher, Arc::clone(&sink) as BoxedReplySink, idle);
        (lanes, sink)
    }

    fn select(chat: i64) -> InboundEvent {
        InboundEvent::MenuSelection {
            chat_id: ChatId(chat),
            intent: Intent::Analyze,
        }
    }

    fn say(chat: i64, text: &str) -> InboundEvent {
        InboundEvent::FreeText {
            chat_id: ChatId(chat),
            text: text.to_string(),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_events_of_one_chat_stay_ordered() {
        let (lanes, sink) = setup(Duration::from_secs(5));

        lanes.submit(select(1));
        lanes.submit(say(1, "80"));
        lanes.submit(select(1));
        lanes.submit(say(1, "1"));
        lanes.shutdown().await;

        let replies = sink.for_chat(1);
        assert_eq!(replies.len(), 4);
        assert_eq!(replies[1], "done 80");
        assert_eq!(replies[3], "done 1");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_slow_chat_does_not_block_others() {
        let (lanes, sink) = setup(Duration::from_secs(5));

        lanes.submit(select(1));
        lanes.submit(say(1, "300"));
        tokio::time::sleep(Duration::from_millis(20)).await;

        lanes.submit(select(2));
        lanes.submit(say(2, "0"));
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Chat 2 finished while chat 1 is still inside its capability.
        assert_eq!(sink.for_chat(2).len(), 2);
        assert_eq!(sink.for_chat(1).len(), 1);

        lanes.shutdown().await;
        assert_eq!(sink.for_chat(1).len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_idle_lane_exits_and_restarts() {
        let (lanes, sink) = setup(Duration::from_millis(30));

        lanes.submit(select(7));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(lanes.active(), 0);

        // Session state outlives the lane.
        lanes.submit(say(7, "0"));
        lanes.shutdown().await;
        let replies = sink.for_chat(7);
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[1], "done 0");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_chats_concurrently() {
        let (lanes, sink) = setup(Duration::from_secs(5));

        for chat in 0..50 {
            lanes.submit(select(chat));
            lanes.submit(say(chat, "5"));
        }
        lanes.shutdown().await;

        for chat in 0..50 {
            assert_eq!(sink.for_chat(chat).last().map(String::as_str), Some("done 5"));
        }
    }
}
