//! User-facing reply texts.
//!
//! Failures are translated here so that the dispatcher never leaks internal
//! error details to a chat, except validation hints which are meant for the
//! user.

use std::fmt::Write;

use switchboard_core::{CapabilityError, RoutingError};

use crate::error::InvokeError;
use crate::menu::IntentMenu;
use crate::registry::CapabilityRegistry;

/// Reply for upstream outages and timeouts.
pub const TRY_LATER: &str = "Сервис временно недоступен, попробуйте позже.";
/// Reply for local I/O failures.
pub const OPERATION_FAILED: &str = "Не удалось выполнить операцию. Попробуйте позже.";
/// Reply for anything unexpected.
pub const INTERNAL_ERROR: &str = "Произошла внутренняя ошибка.";
/// Reply when an intent has no capability behind it.
pub const UNAVAILABLE: &str = "Это действие сейчас недоступно.";

/// Translates a failed capability call into a reply.
pub fn failure(err: &InvokeError) -> String {
    match err {
        InvokeError::Capability(CapabilityError::Validation(hint)) => {
            format!("Ошибка ввода: {hint}")
        }
        InvokeError::Capability(CapabilityError::Transport(_)) | InvokeError::TimedOut(_) => {
            TRY_LATER.to_string()
        }
        InvokeError::Capability(CapabilityError::Io(_)) => OPERATION_FAILED.to_string(),
        InvokeError::Panicked(_) | InvokeError::Internal(_) => INTERNAL_ERROR.to_string(),
    }
}

/// Translates a routing failure into a reply.
pub fn routing(err: &RoutingError) -> String {
    match err {
        RoutingError::UnknownCommand(name) => {
            format!("Неизвестная команда: /{name}. Отправьте /help, чтобы увидеть список команд.")
        }
        RoutingError::UnknownIntent(_) | RoutingError::UnboundIntent(_) => UNAVAILABLE.to_string(),
    }
}

/// Builds the `/help` text from the menu and the command table.
pub fn help(menu: &IntentMenu, registry: &CapabilityRegistry) -> String {
    let mut out = String::from("Доступные действия в меню (/start):\n");
    for option in menu.options() {
        let _ = writeln!(out, "• {}", option.label);
    }

    out.push_str("\nКоманды:\n/start — показать меню\n/help — эта справка\n");
    for spec in registry.commands() {
        if spec.usage.is_empty() {
            let _ = writeln!(out, "/{} — {}", spec.name, spec.description);
        } else {
            let _ = writeln!(out, "/{} {} — {}", spec.name, spec.usage, spec.description);
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_failure_texts() {
        let validation = InvokeError::Capability(CapabilityError::validation("нужно два слова"));
        assert_eq!(failure(&validation), "Ошибка ввода: нужно два слова");

        let transport = InvokeError::Capability(CapabilityError::transport("HTTP 502"));
        assert_eq!(failure(&transport), TRY_LATER);
        assert_eq!(failure(&InvokeError::TimedOut(Duration::from_secs(1))), TRY_LATER);

        let io = InvokeError::Capability(CapabilityError::io("disk full"));
        assert_eq!(failure(&io), OPERATION_FAILED);
        assert!(!failure(&io).contains("disk full"));

        assert_eq!(failure(&InvokeError::Panicked("x".into())), INTERNAL_ERROR);
    }

    #[test]
    fn test_unknown_command_text() {
        let text = routing(&RoutingError::UnknownCommand("frobnicate".into()));
        assert!(text.contains("/frobnicate"));
        assert!(text.contains("/help"));
    }

    #[test]
    fn test_help_lists_menu() {
        let text = help(&IntentMenu::new(), &CapabilityRegistry::default());
        assert!(text.contains("Погода"));
        assert!(text.contains("/start"));
    }
}
