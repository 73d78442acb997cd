//! Reply delivery via `sendMessage`.

use async_trait::async_trait;
use serde_json::Value;
use switchboard_core::{ChatId, Reply, ReplySink, TransportResult};
use tracing::trace;

use super::client::TelegramClient;
use super::types::{InlineKeyboardButton, InlineKeyboardMarkup, SendMessage};

/// Sends replies, rendering menus as an inline keyboard with one button per row.
#[derive(Debug, Clone)]
pub struct TelegramSender {
    client: TelegramClient,
}

impl TelegramSender {
    /// Creates a sender over `client`.
    pub fn new(client: TelegramClient) -> Self {
        Self { client }
    }
}

pub(crate) fn render(chat_id: ChatId, reply: &Reply) -> SendMessage<'_> {
    let reply_markup = reply.menu.as_ref().map(|options| InlineKeyboardMarkup {
        inline_keyboard: options
            .iter()
            .map(|option| {
                vec![InlineKeyboardButton {
                    text: option.label,
                    callback_data: option.intent.callback_data(),
                }]
            })
            .collect(),
    });

    SendMessage {
        chat_id: chat_id.get(),
        text: &reply.text,
        reply_markup,
    }
}

#[async_trait]
impl ReplySink for TelegramSender {
    async fn send(&self, chat_id: ChatId, reply: &Reply) -> TransportResult<()> {
        trace!(%chat_id, "Sending reply");
        // The sent Message object is not needed.
        let _: Value = self.client.call("sendMessage", &render(chat_id, reply)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_core::{Intent, MenuOption};

    #[test]
    fn test_render_keyboard_one_button_per_row() {
        let reply = Reply::text("Привет! Выберите действие:").with_menu(vec![
            MenuOption {
                label: "Погода",
                intent: Intent::Weather,
            },
            MenuOption {
                label: "Оплата",
                intent: Intent::Payment,
            },
        ]);
        let json = serde_json::to_value(render(ChatId(3), &reply)).unwrap();

        assert_eq!(json["chat_id"], 3);
        let rows = json["reply_markup"]["inline_keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0]["text"], "Погода");
        assert_eq!(rows[1][0]["callback_data"], "payment");
    }

    #[test]
    fn test_render_plain_text() {
        let reply = Reply::text("ok");
        let json = serde_json::to_value(render(ChatId(3), &reply)).unwrap();
        assert!(json.get("reply_markup").is_none());
    }
}
