//! The intent menu shown by `/start`.

use switchboard_core::{Intent, MenuOption, Reply};

const GREETING: &str = "Привет! Выберите действие:";

const OPTIONS: [MenuOption; 5] = [
    MenuOption {
        label: "Погода",
        intent: Intent::Weather,
    },
    MenuOption {
        label: "Событие",
        intent: Intent::Event,
    },
    MenuOption {
        label: "Анализ данных",
        intent: Intent::Analyze,
    },
    MenuOption {
        label: "Оплата",
        intent: Intent::Payment,
    },
    MenuOption {
        label: "Обработать изображение",
        intent: Intent::Image,
    },
];

/// Fixed, ordered menu of intents.
///
/// Selecting an option is pure: [`on_select`](Self::on_select) only returns
/// the prompt. Arming the session is the dispatcher's job.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentMenu;

impl IntentMenu {
    /// Creates the menu.
    pub fn new() -> Self {
        Self
    }

    /// Returns the options in display order.
    pub fn options(&self) -> &'static [MenuOption] {
        &OPTIONS
    }

    /// Returns the prompt inviting the follow-up text for `intent`.
    pub fn on_select(&self, intent: Intent) -> &'static str {
        match intent {
            Intent::Weather => "Введите город для получения погоды.",
            Intent::Event => "Введите детали события.",
            Intent::Analyze => "Введите числа через запятую для анализа.",
            Intent::Payment => "Введите сумму для оплаты и имя пользователя.",
            Intent::Image => {
                "Введите путь к изображению и (необязательно) путь для сохранения результата."
            }
        }
    }

    /// Returns the label shown for `intent`.
    pub fn label(&self, intent: Intent) -> &'static str {
        OPTIONS
            .iter()
            .find(|option| option.intent == intent)
            .map_or("", |option| option.label)
    }

    /// Builds the greeting reply with the inline keyboard attached.
    pub fn reply(&self) -> Reply {
        Reply::text(GREETING).with_menu(OPTIONS.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_cover_every_intent_in_order() {
        let menu = IntentMenu::new();
        let intents: Vec<_> = menu.options().iter().map(|o| o.intent).collect();
        assert_eq!(intents, Intent::ALL.to_vec());
    }

    #[test]
    fn test_prompts_and_labels() {
        let menu = IntentMenu::new();
        assert_eq!(
            menu.on_select(Intent::Weather),
            "Введите город для получения погоды."
        );
        assert_eq!(menu.label(Intent::Analyze), "Анализ данных");
        for intent in Intent::ALL {
            assert!(!menu.on_select(intent).is_empty());
            assert!(!menu.label(intent).is_empty());
        }
    }

    #[test]
    fn test_reply_carries_keyboard() {
        let reply = IntentMenu::new().reply();
        assert_eq!(reply.text, GREETING);
        assert_eq!(reply.menu.as_deref().map(<[_]>::len), Some(5));
    }
}
