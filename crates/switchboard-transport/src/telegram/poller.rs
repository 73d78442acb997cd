//! Long-poll event source.

use async_trait::async_trait;
use futures::future::join_all;
use switchboard_core::{ChatId, EventSource, InboundEvent, Intent, TransportResult};
use tracing::{debug, warn};

use super::client::TelegramClient;
use super::types::{AnswerCallbackQuery, GetUpdates, Update};

const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

/// Pulls updates with `getUpdates` and classifies them.
///
/// The offset advances past every update received, including ones that are
/// dropped, so nothing is redelivered.
#[derive(Debug)]
pub struct TelegramPoller {
    client: TelegramClient,
    offset: i64,
}

impl TelegramPoller {
    /// Creates a poller starting from the oldest unconfirmed update.
    pub fn new(client: TelegramClient) -> Self {
        Self { client, offset: 0 }
    }

    /// Next `getUpdates` offset.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    async fn answer_callback(&self, id: &str) {
        let params = AnswerCallbackQuery {
            callback_query_id: id,
        };
        if let Err(e) = self
            .client
            .call::<_, bool>("answerCallbackQuery", &params)
            .await
        {
            warn!(error = %e, "Failed to answer callback query");
        }
    }
}

/// Classifies one update. Returns `None` for updates the dispatcher has no
/// use for.
pub(crate) fn classify(update: &Update) -> Option<InboundEvent> {
    if let Some(query) = &update.callback_query {
        let chat_id = ChatId(query.chat_id());
        let data = query.data.as_deref().unwrap_or_default();
        return match Intent::from_callback(data) {
            Some(intent) => Some(InboundEvent::MenuSelection { chat_id, intent }),
            None => {
                warn!(%chat_id, data, "Dropping callback with unknown data");
                None
            }
        };
    }

    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?;
    Some(InboundEvent::from_text(ChatId(message.chat.id), text))
}

#[async_trait]
impl EventSource for TelegramPoller {
    async fn next_batch(&mut self) -> TransportResult<Vec<InboundEvent>> {
        let params = GetUpdates {
            offset: self.offset,
            timeout: self.client.poll_timeout().as_secs(),
            allowed_updates: ALLOWED_UPDATES,
        };
        let updates: Vec<Update> = self.client.call("getUpdates", &params).await?;

        let mut events = Vec::with_capacity(updates.len());
        let mut callbacks = Vec::new();
        for update in &updates {
            self.offset = self.offset.max(update.update_id + 1);

            if let Some(query) = &update.callback_query {
                callbacks.push(query.id.as_str());
            }
            match classify(update) {
                Some(event) => events.push(event),
                None => debug!(update_id = update.update_id, "Ignoring update"),
            }
        }

        // Every press is acknowledged, in parallel, before the batch is handed on.
        join_all(callbacks.into_iter().map(|id| self.answer_callback(id))).await;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::TelegramConfig;

    fn update(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_classify_messages() {
        let cmd = update(r#"{"update_id":1,"message":{"message_id":1,"chat":{"id":5},"text":"/Pay@SwitchBot 100 alice"}}"#);
        assert_eq!(
            classify(&cmd),
            Some(InboundEvent::SlashCommand {
                chat_id: ChatId(5),
                name: "pay".into(),
                args: "100 alice".into(),
            })
        );

        let text = update(r#"{"update_id":2,"message":{"message_id":2,"chat":{"id":5},"text":"Москва"}}"#);
        assert_eq!(
            classify(&text),
            Some(InboundEvent::FreeText {
                chat_id: ChatId(5),
                text: "Москва".into(),
            })
        );
    }

    #[test]
    fn test_classify_callbacks() {
        let known = update(
            r#"{"update_id":3,"callback_query":{"id":"q","from":{"id":9},"message":{"message_id":1,"chat":{"id":-100}},"data":"process_image"}}"#,
        );
        assert_eq!(
            classify(&known),
            Some(InboundEvent::MenuSelection {
                chat_id: ChatId(-100),
                intent: Intent::Image,
            })
        );

        let unknown = update(r#"{"update_id":4,"callback_query":{"id":"q","from":{"id":9},"data":"bogus"}}"#);
        assert_eq!(classify(&unknown), None);
    }

    #[test]
    fn test_classify_ignores_non_text() {
        let photo = update(r#"{"update_id":5,"message":{"message_id":3,"chat":{"id":5},"photo":[]}}"#);
        assert_eq!(classify(&photo), None);
    }

    /// Minimal Bot API stand-in: returns `updates` from `getUpdates` and
    /// delays every `answerCallbackQuery` by `answer_delay`.
    mod stub {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::time::Duration;

        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::{TcpListener, TcpStream};

        pub struct BotApi {
            pub url: String,
            pub answered: Arc<AtomicUsize>,
        }

        pub async fn start(updates: &'static str, answer_delay: Duration) -> BotApi {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let url = format!("http://{}", listener.local_addr().unwrap());
            let answered = Arc::new(AtomicUsize::new(0));

            let counter = Arc::clone(&answered);
            tokio::spawn(async move {
                while let Ok((socket, _)) = listener.accept().await {
                    let counter = Arc::clone(&counter);
                    tokio::spawn(serve(socket, updates, answer_delay, counter));
                }
            });
            BotApi { url, answered }
        }

        async fn serve(
            mut socket: TcpStream,
            updates: &'static str,
            answer_delay: Duration,
            answered: Arc<AtomicUsize>,
        ) {
            let Some(head) = read_request(&mut socket).await else {
                return;
            };
            let body = if head.contains("/answerCallbackQuery") {
                tokio::time::sleep(answer_delay).await;
                answered.fetch_add(1, Ordering::SeqCst);
                r#"{"ok":true,"result":true}"#.to_string()
            } else {
                format!(r#"{{"ok":true,"result":{updates}}}"#)
            };
            let response = format!(
                "HTTP/1.1 200 OK\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }

        /// Reads headers and body; returns the header block.
        async fn read_request(socket: &mut TcpStream) -> Option<String> {
            let mut data = Vec::new();
            let mut buf = [0u8; 1024];
            let header_end = loop {
                if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                let n = socket.read(&mut buf).await.ok().filter(|&n| n > 0)?;
                data.extend_from_slice(&buf[..n]);
            };
            let head = String::from_utf8_lossy(&data[..header_end]).into_owned();
            let length: usize = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse().ok())
                        .flatten()
                })
                .unwrap_or(0);
            while data.len() < header_end + length {
                let n = socket.read(&mut buf).await.ok().filter(|&n| n > 0)?;
                data.extend_from_slice(&buf[..n]);
            }
            Some(head)
        }
    }

    const THREE_PRESSES: &str = r#"[
        {"update_id":10,"callback_query":{"id":"a","from":{"id":1},"data":"weather"}},
        {"update_id":11,"callback_query":{"id":"b","from":{"id":2},"data":"analyze"}},
        {"update_id":12,"callback_query":{"id":"c","from":{"id":3},"data":"bogus"}},
        {"update_id":13,"message":{"message_id":1,"chat":{"id":4},"text":"/tmp/a.png"}}
    ]"#;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_batch_answers_callbacks_concurrently() {
        use std::sync::atomic::Ordering;
        use std::time::{Duration, Instant};

        let api = stub::start(THREE_PRESSES, Duration::from_millis(300)).await;
        let client = TelegramClient::new(TelegramConfig {
            token: "42:test".into(),
            api_url: api.url.clone(),
            poll_timeout: Duration::from_secs(1),
        })
        .unwrap();
        let mut poller = TelegramPoller::new(client);

        let started = Instant::now();
        let events = poller.next_batch().await.unwrap();
        let elapsed = started.elapsed();

        // Unknown callback data is still answered.
        assert_eq!(api.answered.load(Ordering::SeqCst), 3);
        assert!(elapsed < Duration::from_millis(800), "answers ran serially: {elapsed:?}");
        assert_eq!(poller.offset(), 14);
        assert_eq!(
            events,
            vec![
                InboundEvent::MenuSelection {
                    chat_id: ChatId(1),
                    intent: Intent::Weather,
                },
                InboundEvent::MenuSelection {
                    chat_id: ChatId(2),
                    intent: Intent::Analyze,
                },
                InboundEvent::FreeText {
                    chat_id: ChatId(4),
                    text: "/tmp/a.png".into(),
                },
            ]
        );
    }
}
