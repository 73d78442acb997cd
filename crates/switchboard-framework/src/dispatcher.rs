//! The conversation dispatcher.
//!
//! Each chat is either `Idle` or `AwaitingInput(intent)`:
//!
//! | State | Event | Effect |
//! |-------|-------|--------|
//! | any | `MenuSelection(i)` | prompt for `i`, arm `i`, no capability call |
//! | `AwaitingInput(i)` | `FreeText(t)` | call capability for `i` with `t`, reply, clear |
//! | `Idle` | `FreeText(_)` | dropped |
//! | any | `SlashCommand(n, a)` | call command `n` with `a`, session untouched |
//!
//! The clear after free text is unconditional: a failed call does not re-arm
//! the intent, the user has to select it again.
//!
//! ```rust,ignore
//! let dispatcher = ConversationDispatcher::new(registry, Arc::new(SessionStore::new()));
//!
//! if let Some(result) = dispatcher.dispatch(event).await {
//!     sink.send(chat_id, &result.reply).await?;
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use switchboard_core::{
    BoxedCapability, ChatId, DispatchResult, InboundEvent, Intent, Reply, SessionMutation,
};
use tracing::{Instrument, debug, debug_span, error, info, warn};

use crate::error::InvokeError;
use crate::menu::IntentMenu;
use crate::registry::CapabilityRegistry;
use crate::service::invoke;
use crate::session::SessionStore;
use crate::text;

/// Default bound on a single capability call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Routes inbound events to capabilities and keeps per-chat state.
///
/// # Thread Safety
///
/// `ConversationDispatcher` is `Send + Sync`. Events of *different* chats may
/// be dispatched concurrently; events of the *same* chat must be dispatched
/// one at a time, in arrival order.
pub struct ConversationDispatcher {
    sessions: Arc<SessionStore>,
    menu: IntentMenu,
    registry: CapabilityRegistry,
    call_timeout: Duration,
}

impl ConversationDispatcher {
    /// Creates a dispatcher over `registry` and `sessions`.
    pub fn new(registry: CapabilityRegistry, sessions: Arc<SessionStore>) -> Self {
        Self {
            sessions,
            menu: IntentMenu::new(),
            registry,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Sets the per-call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Returns the session store.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Returns the capability registry.
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Returns the intent menu.
    pub fn menu(&self) -> &IntentMenu {
        &self.menu
    }

    /// Handles one event, applies its session mutation and returns the reply.
    ///
    /// Returns `None` when the event is ignored (free text while idle).
    pub async fn dispatch(&self, event: InboundEvent) -> Option<DispatchResult> {
        let chat_id = event.chat_id();
        let span = debug_span!("dispatch", chat_id = %chat_id, kind = event.kind());

        async move {
            let result = match event {
                InboundEvent::MenuSelection { intent, .. } => Some(self.select(intent)),
                InboundEvent::FreeText { text, .. } => self.free_text(chat_id, text).await,
                InboundEvent::SlashCommand { name, args, .. } => {
                    Some(self.command(&name, &args).await)
                }
            };

            if let Some(result) = &result {
                self.sessions.apply(chat_id, result.mutation);
            }
            result
        }
        .instrument(span)
        .await
    }

    fn select(&self, intent: Intent) -> DispatchResult {
        debug!(intent = %intent, "Menu selection, awaiting input");
        DispatchResult::new(
            Reply::text(self.menu.on_select(intent)),
            SessionMutation::Arm(intent),
        )
    }

    async fn free_text(&self, chat_id: ChatId, input: String) -> Option<DispatchResult> {
        let Some(intent) = self.sessions.read(chat_id).pending_intent else {
            debug!("No pending intent, ignoring free text");
            return None;
        };

        let reply = match self.registry.resolve_by_intent(intent) {
            Ok(capability) => self.call(&capability, &input).await,
            Err(err) => {
                warn!(intent = %intent, error = %err, "Pending intent has no capability");
                text::routing(&err)
            }
        };

        Some(DispatchResult::new(Reply::text(reply), SessionMutation::Clear))
    }

    async fn command(&self, name: &str, args: &str) -> DispatchResult {
        let reply = match name {
            "start" | "menu" => self.menu.reply(),
            "help" => Reply::text(text::help(&self.menu, &self.registry)),
            _ => match self.registry.resolve_by_command(name) {
                Ok(capability) => Reply::text(self.call(&capability, args).await),
                Err(err) => {
                    debug!(command = name, "Unrecognized command");
                    Reply::text(text::routing(&err))
                }
            },
        };

        DispatchResult::new(reply, SessionMutation::Keep)
    }

    async fn call(&self, capability: &BoxedCapability, input: &str) -> String {
        let name = capability.name();
        match invoke(capability, input, self.call_timeout).await {
            Ok(reply) => {
                info!(capability = name, "Capability call succeeded");
                reply
            }
            Err(err) => {
                match &err {
                    InvokeError::Capability(e) => {
                        warn!(capability = name, kind = ?e.kind(), error = %e, "Capability call failed");
                    }
                    InvokeError::TimedOut(after) => {
                        warn!(capability = name, timeout = ?after, "Capability call timed out");
                    }
                    InvokeError::Panicked(_) | InvokeError::Internal(_) => {
                        error!(capability = name, error = %err, "Capability call crashed");
                    }
                }
                text::failure(&err)
            }
        }
    }
}

impl std::fmt::Debug for ConversationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationDispatcher")
            .field("registry", &self.registry)
            .field("sessions", &self.sessions.len())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CommandSpec;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use switchboard_core::{Capability, CapabilityError, CapabilityResult};

    /// Echoes its input and counts calls.
    #[derive(Default)]
    struct Echo {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Capability for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn handle(&self, input: &str) -> CapabilityResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("echo: {input}"))
        }
    }

    struct Failing(CapabilityError);

    #[async_trait]
    impl Capability for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn handle(&self, _input: &str) -> CapabilityResult<String> {
            Err(self.0.clone())
        }
    }

    struct Panicking;

    #[async_trait]
    impl Capability for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        async fn handle(&self, _input: &str) -> CapabilityResult<String> {
            panic!("adapter bug");
        }
    }

    struct Stalled;

    #[async_trait]
    impl Capability for Stalled {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn handle(&self, _input: &str) -> CapabilityResult<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("too late".into())
        }
    }

    struct Fixture {
        dispatcher: ConversationDispatcher,
        echo: Arc<Echo>,
    }

    fn fixture() -> Fixture {
        let echo = Arc::new(Echo::default());
        let registry = CapabilityRegistry::builder()
            .intent(Intent::Weather, echo.clone())
            .intent(Intent::Event, echo.clone())
            .intent(
                Intent::Payment,
                Arc::new(Failing(CapabilityError::validation("нужно: сумма пользователь"))),
            )
            .intent(
                Intent::Analyze,
                Arc::new(Failing(CapabilityError::transport("HTTP 503"))),
            )
            .intent(Intent::Image, Arc::new(Panicking))
            .command(CommandSpec::new("echo", "<текст>", "повторить"), echo.clone())
            .command(CommandSpec::new("stall", "", "зависнуть"), Arc::new(Stalled))
            .build();

        let dispatcher = ConversationDispatcher::new(registry, Arc::new(SessionStore::new()))
            .with_call_timeout(Duration::from_millis(50));
        Fixture { dispatcher, echo }
    }

    fn select(chat: i64, intent: Intent) -> InboundEvent {
        InboundEvent::MenuSelection {
            chat_id: ChatId(chat),
            intent,
        }
    }

    fn say(chat: i64, text: &str) -> InboundEvent {
        InboundEvent::FreeText {
            chat_id: ChatId(chat),
            text: text.to_string(),
        }
    }

    fn pending(f: &Fixture, chat: i64) -> Option<Intent> {
        f.dispatcher.sessions().read(ChatId(chat)).pending_intent
    }

    #[tokio::test]
    async fn test_selection_arms_without_invoking() {
        let f = fixture();
        let result = f.dispatcher.dispatch(select(1, Intent::Weather)).await.unwrap();

        assert_eq!(result.reply_text(), "Введите город для получения погоды.");
        assert_eq!(result.mutation, SessionMutation::Arm(Intent::Weather));
        assert_eq!(pending(&f, 1), Some(Intent::Weather));
        assert_eq!(f.echo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_free_text_invokes_and_clears() {
        let f = fixture();
        f.dispatcher.dispatch(select(1, Intent::Weather)).await;
        let result = f.dispatcher.dispatch(say(1, "Moscow")).await.unwrap();

        assert_eq!(result.reply_text(), "echo: Moscow");
        assert_eq!(result.mutation, SessionMutation::Clear);
        assert_eq!(pending(&f, 1), None);
        assert_eq!(f.echo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_free_text_passed_verbatim() {
        let f = fixture();
        f.dispatcher.dispatch(select(1, Intent::Event)).await;
        let result = f.dispatcher.dispatch(say(1, "  Митап  в 19:00 ")).await.unwrap();
        assert_eq!(result.reply_text(), "echo:   Митап  в 19:00 ");
    }

    #[tokio::test]
    async fn test_absolute_path_reaches_armed_capability() {
        let echo = Arc::new(Echo::default());
        let registry = CapabilityRegistry::builder()
            .intent(Intent::Image, echo.clone())
            .build();
        let dispatcher = ConversationDispatcher::new(registry, Arc::new(SessionStore::new()));

        dispatcher.dispatch(select(1, Intent::Image)).await;
        let event = InboundEvent::from_text(ChatId(1), "/tmp/a.png /tmp/b.png");
        assert_eq!(event.kind(), "free_text");

        let result = dispatcher.dispatch(event).await.unwrap();
        assert_eq!(result.reply_text(), "echo: /tmp/a.png /tmp/b.png");
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
        assert!(dispatcher.sessions().read(ChatId(1)).is_idle());
    }

    #[tokio::test]
    async fn test_failure_still_clears() {
        let f = fixture();

        f.dispatcher.dispatch(select(1, Intent::Payment)).await;
        let result = f.dispatcher.dispatch(say(1, "100")).await.unwrap();
        assert_eq!(result.reply_text(), "Ошибка ввода: нужно: сумма пользователь");
        assert_eq!(pending(&f, 1), None);

        f.dispatcher.dispatch(select(1, Intent::Analyze)).await;
        let result = f.dispatcher.dispatch(say(1, "1,2")).await.unwrap();
        assert_eq!(result.reply_text(), text::TRY_LATER);
        assert_eq!(pending(&f, 1), None);
    }

    #[tokio::test]
    async fn test_panic_is_contained_and_clears() {
        let f = fixture();
        f.dispatcher.dispatch(select(1, Intent::Image)).await;
        let result = f.dispatcher.dispatch(say(1, "a.png")).await.unwrap();

        assert_eq!(result.reply_text(), text::INTERNAL_ERROR);
        assert_eq!(pending(&f, 1), None);

        // The dispatcher keeps serving afterwards.
        f.dispatcher.dispatch(select(1, Intent::Weather)).await;
        let result = f.dispatcher.dispatch(say(1, "Kazan")).await.unwrap();
        assert_eq!(result.reply_text(), "echo: Kazan");
    }

    #[tokio::test]
    async fn test_idle_free_text_is_dropped() {
        let f = fixture();
        assert!(f.dispatcher.dispatch(say(1, "hello")).await.is_none());
        assert_eq!(pending(&f, 1), None);
        assert_eq!(f.echo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_free_text_after_reset_is_dropped() {
        let f = fixture();
        f.dispatcher.dispatch(select(1, Intent::Weather)).await;
        assert!(f.dispatcher.dispatch(say(1, "Moscow")).await.is_some());
        assert!(f.dispatcher.dispatch(say(1, "Moscow")).await.is_none());
        assert_eq!(f.echo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slash_command_leaves_session_untouched() {
        let f = fixture();
        let command = InboundEvent::from_text(ChatId(1), "/echo hi there");

        let result = f.dispatcher.dispatch(command.clone()).await.unwrap();
        assert_eq!(result.reply_text(), "echo: hi there");
        assert_eq!(result.mutation, SessionMutation::Keep);
        assert_eq!(pending(&f, 1), None);

        f.dispatcher.dispatch(select(1, Intent::Event)).await;
        f.dispatcher.dispatch(command).await;
        f.dispatcher
            .dispatch(InboundEvent::from_text(ChatId(1), "/start"))
            .await;
        f.dispatcher
            .dispatch(InboundEvent::from_text(ChatId(1), "/nope"))
            .await;
        assert_eq!(pending(&f, 1), Some(Intent::Event));
    }

    #[tokio::test]
    async fn test_unknown_command_is_a_reply() {
        let f = fixture();
        let result = f
            .dispatcher
            .dispatch(InboundEvent::from_text(ChatId(1), "/teleport mars"))
            .await
            .unwrap();
        assert!(result.reply_text().contains("/teleport"));
        assert_eq!(result.mutation, SessionMutation::Keep);
    }

    #[tokio::test]
    async fn test_start_shows_menu() {
        let f = fixture();
        let result = f
            .dispatcher
            .dispatch(InboundEvent::from_text(ChatId(1), "/start"))
            .await
            .unwrap();
        assert_eq!(result.reply.menu.as_ref().map(Vec::len), Some(5));

        let help = f
            .dispatcher
            .dispatch(InboundEvent::from_text(ChatId(1), "/help"))
            .await
            .unwrap();
        assert!(help.reply_text().contains("/echo <текст>"));
        assert!(help.reply.menu.is_none());
    }

    #[tokio::test]
    async fn test_command_timeout() {
        let f = fixture();
        let result = f
            .dispatcher
            .dispatch(InboundEvent::from_text(ChatId(1), "/stall"))
            .await
            .unwrap();
        assert_eq!(result.reply_text(), text::TRY_LATER);
    }

    #[tokio::test]
    async fn test_repeated_selection_is_idempotent() {
        let f = fixture();
        let first = f.dispatcher.dispatch(select(1, Intent::Weather)).await;
        let second = f.dispatcher.dispatch(select(1, Intent::Weather)).await;

        assert_eq!(first, second);
        assert_eq!(pending(&f, 1), Some(Intent::Weather));
    }

    #[tokio::test]
    async fn test_reselection_replaces_pending_intent() {
        let f = fixture();
        f.dispatcher.dispatch(select(1, Intent::Weather)).await;
        f.dispatcher.dispatch(select(1, Intent::Event)).await;
        assert_eq!(pending(&f, 1), Some(Intent::Event));
    }

    #[tokio::test]
    async fn test_chats_do_not_share_state() {
        let f = fixture();
        f.dispatcher.dispatch(select(1, Intent::Weather)).await;
        f.dispatcher.dispatch(select(2, Intent::Payment)).await;

        let a = f.dispatcher.dispatch(say(1, "Omsk")).await.unwrap();
        assert_eq!(a.reply_text(), "echo: Omsk");
        assert_eq!(pending(&f, 2), Some(Intent::Payment));

        let b = f.dispatcher.dispatch(say(2, "5")).await.unwrap();
        assert!(b.reply_text().starts_with("Ошибка ввода"));
        assert_eq!(pending(&f, 1), None);
        assert_eq!(pending(&f, 2), None);
    }

    #[tokio::test]
    async fn test_unbound_intent_replies_and_clears() {
        let registry = CapabilityRegistry::builder().build();
        let dispatcher = ConversationDispatcher::new(registry, Arc::new(SessionStore::new()));

        dispatcher
            .dispatch(InboundEvent::MenuSelection {
                chat_id: ChatId(9),
                intent: Intent::Weather,
            })
            .await;
        let result = dispatcher
            .dispatch(InboundEvent::FreeText {
                chat_id: ChatId(9),
                text: "Moscow".into(),
            })
            .await
            .unwrap();

        assert_eq!(result.reply_text(), text::UNAVAILABLE);
        assert!(dispatcher.sessions().read(ChatId(9)).is_idle());
    }
}
