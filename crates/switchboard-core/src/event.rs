//! Inbound events and outbound replies.

use crate::chat::{ChatId, SessionMutation};
use crate::intent::Intent;

/// An update delivered by the transport, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// An inline menu button was pressed.
    MenuSelection {
        /// Chat the button belongs to.
        chat_id: ChatId,
        /// Intent carried by the button.
        intent: Intent,
    },
    /// A `/command args...` message.
    SlashCommand {
        /// Originating chat.
        chat_id: ChatId,
        /// Lower-cased command name without the slash or `@bot` suffix.
        name: String,
        /// Everything after the command name, trimmed.
        args: String,
    },
    /// Any other text message.
    FreeText {
        /// Originating chat.
        chat_id: ChatId,
        /// The verbatim message text.
        text: String,
    },
}

impl InboundEvent {
    /// Classifies a text message as either a slash command or free text.
    ///
    /// `"/Weather@MyBot  Moscow"` becomes `SlashCommand { name: "weather", args: "Moscow" }`.
    /// Only heads that follow the Bot API command grammar count as commands,
    /// so `"/tmp/photo.png"` stays free text. Free text is kept verbatim.
    pub fn from_text(chat_id: ChatId, text: &str) -> Self {
        let command = text.strip_prefix('/').and_then(|body| {
            let (head, args) = match body.split_once(char::is_whitespace) {
                Some((head, rest)) => (head, rest.trim()),
                None => (body, ""),
            };
            command_name(head).map(|name| (name, args))
        });

        match command {
            Some((name, args)) => Self::SlashCommand {
                chat_id,
                name: name.to_lowercase(),
                args: args.to_string(),
            },
            None => Self::FreeText {
                chat_id,
                text: text.to_string(),
            },
        }
    }

    /// Returns the chat this event belongs to.
    pub fn chat_id(&self) -> ChatId {
        match self {
            Self::MenuSelection { chat_id, .. }
            | Self::SlashCommand { chat_id, .. }
            | Self::FreeText { chat_id, .. } => *chat_id,
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MenuSelection { .. } => "menu_selection",
            Self::SlashCommand { .. } => "slash_command",
            Self::FreeText { .. } => "free_text",
        }
    }
}

/// Extracts the name from `name` or `name@bot`.
///
/// Names are 1 to 32 characters of `[A-Za-z0-9_]`; the bot suffix uses the
/// same alphabet.
fn command_name(head: &str) -> Option<&str> {
    const MAX_NAME: usize = 32;

    let is_word = |s: &str| {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
    };

    let (name, bot) = match head.split_once('@') {
        Some((name, bot)) => (name, Some(bot)),
        None => (head, None),
    };
    if name.len() > MAX_NAME || !is_word(name) || bot.is_some_and(|bot| !is_word(bot)) {
        return None;
    }
    Some(name)
}

/// A selectable menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuOption {
    /// Button label.
    pub label: &'static str,
    /// Intent armed when the button is pressed.
    pub intent: Intent,
}

/// An outbound message for a single chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Message text.
    pub text: String,
    /// Inline keyboard to attach, one button per row.
    pub menu: Option<Vec<MenuOption>>,
}

impl Reply {
    /// Creates a plain text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: None,
        }
    }

    /// Attaches an inline keyboard.
    pub fn with_menu(mut self, options: impl Into<Vec<MenuOption>>) -> Self {
        self.menu = Some(options.into());
        self
    }
}

/// Outcome of dispatching one event: always a reply, plus the session change
/// that was applied for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    /// Message to send back to the chat.
    pub reply: Reply,
    /// Session change applied while handling the event.
    pub mutation: SessionMutation,
}

impl DispatchResult {
    /// Creates a result.
    pub fn new(reply: Reply, mutation: SessionMutation) -> Self {
        Self { reply, mutation }
    }

    /// Convenience accessor for the reply text.
    pub fn reply_text(&self) -> &str {
        &self.reply.text
    }
}
