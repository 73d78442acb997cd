//! Static capability lookup tables.
//!
//! The registry is assembled once at startup through [`RegistryBuilder`] and
//! is read-only afterwards, so lookups need no locking.
//!
//! ```rust,ignore
//! let weather: BoxedCapability = Arc::new(WeatherService::new(config));
//!
//! let registry = CapabilityRegistry::builder()
//!     .intent(Intent::Weather, Arc::clone(&weather))
//!     .command(CommandSpec::new("weather", "<город>", "погода в городе"), weather)
//!     .build();
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use switchboard_core::{BoxedCapability, Intent, RoutingError};
use tracing::{debug, warn};

/// Help metadata for a slash command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Command name without the slash, lower-case.
    pub name: &'static str,
    /// Argument synopsis, e.g. `<сумма> <пользователь>`.
    pub usage: &'static str,
    /// One-line description.
    pub description: &'static str,
}

impl CommandSpec {
    /// Creates a command spec.
    pub const fn new(name: &'static str, usage: &'static str, description: &'static str) -> Self {
        Self {
            name,
            usage,
            description,
        }
    }
}

#[derive(Clone)]
struct CommandEntry {
    spec: CommandSpec,
    capability: BoxedCapability,
}

/// Maps intents and command names to capabilities.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    intents: HashMap<Intent, BoxedCapability>,
    /// Commands in registration order, for help output.
    commands: Vec<CommandEntry>,
    /// Command name to index in `commands`.
    index: HashMap<&'static str, usize>,
}

impl CapabilityRegistry {
    /// Starts building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Returns the capability bound to `intent`.
    pub fn resolve_by_intent(&self, intent: Intent) -> Result<BoxedCapability, RoutingError> {
        self.intents
            .get(&intent)
            .cloned()
            .ok_or(RoutingError::UnboundIntent(intent))
    }

    /// Returns the capability registered under the command `name`.
    pub fn resolve_by_command(&self, name: &str) -> Result<BoxedCapability, RoutingError> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.commands[i].capability))
            .ok_or_else(|| RoutingError::UnknownCommand(name.to_string()))
    }

    /// Returns the registered commands in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandSpec> {
        self.commands.iter().map(|entry| &entry.spec)
    }

    /// Returns the number of bound intents.
    pub fn intent_count(&self) -> usize {
        self.intents.len()
    }

    /// Returns the number of registered commands.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("intent_count", &self.intents.len())
            .field("command_count", &self.commands.len())
            .finish()
    }
}

/// Builder for [`CapabilityRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    registry: CapabilityRegistry,
}

impl RegistryBuilder {
    /// Binds `intent` to `capability`, replacing any previous binding.
    pub fn intent(mut self, intent: Intent, capability: BoxedCapability) -> Self {
        debug!(intent = %intent, capability = capability.name(), "Bound intent");
        if self.registry.intents.insert(intent, capability).is_some() {
            warn!(intent = %intent, "Intent was already bound, replacing");
        }
        self
    }

    /// Registers a slash command, replacing any previous one with the same name.
    pub fn command(mut self, spec: CommandSpec, capability: BoxedCapability) -> Self {
        debug!(command = spec.name, capability = capability.name(), "Registered command");
        let entry = CommandEntry { spec, capability };
        let registry = &mut self.registry;

        if let Some(&i) = registry.index.get(spec.name) {
            warn!(command = spec.name, "Command was already registered, replacing");
            registry.commands[i] = entry;
        } else {
            registry.index.insert(spec.name, registry.commands.len());
            registry.commands.push(entry);
        }
        self
    }

    /// Finishes the registry.
    pub fn build(self) -> CapabilityRegistry {
        self.registry
    }
}
