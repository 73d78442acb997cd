//! The run loop.
//!
//! ```rust,ignore
//! let runtime = SwitchboardRuntime::builder()
//!     .config_file("switchboard.toml")
//!     .build()
//!     .await?;
//! runtime.run().await?;
//! ```
//!
//! [`SwitchboardRuntime::run`] polls Telegram until Ctrl+C or SIGTERM. Each
//! batch of events is fanned out to per-chat lanes; poll failures back off
//! exponentially and never end the loop. On shutdown every lane finishes its
//! queued events before `run` returns.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use switchboard_core::{BoxedReplySink, EventSource};
use switchboard_framework::{CapabilityRegistry, ConversationDispatcher, SessionStore};
use switchboard_transport::{TelegramClient, TelegramPoller, TelegramSender};
use tokio::signal;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::catalog;
use crate::config::{ConfigLoader, SwitchboardConfig, validate_config};
use crate::error::RuntimeResult;
use crate::lanes::ChatLanes;
use crate::logging;

/// The assembled bot.
pub struct SwitchboardRuntime {
    config: SwitchboardConfig,
    dispatcher: Arc<ConversationDispatcher>,
}

impl SwitchboardRuntime {
    /// Creates a runtime builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Initializes logging and builds every capability from `config`.
    ///
    /// The configuration is assumed to be validated.
    pub async fn from_config(config: SwitchboardConfig) -> RuntimeResult<Self> {
        logging::init_from_config(&config.logging);

        let registry = catalog::build_registry(&config.capabilities).await?;
        Ok(Self::with_registry(config, registry))
    }

    /// Creates a runtime around an existing registry.
    pub fn with_registry(config: SwitchboardConfig, registry: CapabilityRegistry) -> Self {
        let sessions = match config.dispatcher.session_ttl() {
            Some(ttl) => SessionStore::with_ttl(ttl),
            None => SessionStore::new(),
        };
        let dispatcher = ConversationDispatcher::new(registry, Arc::new(sessions))
            .with_call_timeout(config.dispatcher.capability_timeout());

        info!(
            call_timeout = ?config.dispatcher.capability_timeout(),
            session_ttl = ?config.dispatcher.session_ttl(),
            "Runtime initialized"
        );

        Self {
            config,
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SwitchboardConfig {
        &self.config
    }

    /// Returns the dispatcher.
    pub fn dispatcher(&self) -> &Arc<ConversationDispatcher> {
        &self.dispatcher
    }

    /// Connects to Telegram and runs until Ctrl+C or SIGTERM.
    pub async fn run(&self) -> RuntimeResult<()> {
        let client = TelegramClient::new(self.config.telegram.to_transport_config())?;
        let source = TelegramPoller::new(client.clone());
        let sink: BoxedReplySink = Arc::new(TelegramSender::new(client));

        let shutdown = CancellationToken::new();
        watch_signals(shutdown.clone())?;

        info!("Switchboard is now running. Press Ctrl+C to stop.");
        self.run_with(source, sink, shutdown).await
    }

    /// Runs the dispatch loop over any transport until `shutdown` fires.
    pub async fn run_with<S>(
        &self,
        mut source: S,
        sink: BoxedReplySink,
        shutdown: CancellationToken,
    ) -> RuntimeResult<()>
    where
        S: EventSource,
    {
        let lanes = ChatLanes::new(
            Arc::clone(&self.dispatcher),
            sink,
            self.config.dispatcher.lane_idle(),
        );
        let evictor = self.config.dispatcher.session_ttl().map(|ttl| {
            spawn_evictor(
                Arc::clone(self.dispatcher.sessions()),
                ttl,
                shutdown.clone(),
            )
        });
        let mut backoff = self.config.telegram.retry.to_backoff();

        loop {
            let batch = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                batch = source.next_batch() => batch,
            };

            match batch {
                Ok(events) => {
                    backoff.reset();
                    trace!(count = events.len(), "Received batch");
                    for event in events {
                        lanes.submit(event);
                    }
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    warn!(
                        error = %e,
                        failures = backoff.failures(),
                        delay = ?delay,
                        "Polling failed, backing off"
                    );
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        info!("Stopping Switchboard runtime");
        lanes.shutdown().await;
        if let Some(evictor) = evictor {
            let _ = evictor.await;
        }
        info!("Runtime stopped");
        Ok(())
    }
}

impl std::fmt::Debug for SwitchboardRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchboardRuntime")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

fn spawn_evictor(
    sessions: Arc<SessionStore>,
    ttl: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let period = (ttl / 2).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let evicted = sessions.evict_expired();
                    if evicted > 0 {
                        debug!(evicted, "Evicted expired sessions");
                    }
                }
            }
        }
    })
}

/// Cancels `token` on Ctrl+C or SIGTERM.
fn watch_signals(token: CancellationToken) -> RuntimeResult<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::spawn(async move {
            tokio::select! {
                _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
            }
            token.cancel();
        });
    }

    #[cfg(not(unix))]
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, shutting down");
                token.cancel();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
        }
    });

    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Loads and validates configuration, then assembles the runtime.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a builder searching the default locations.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    /// Loads exactly this configuration file.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a directory to search for `switchboard.toml`.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges configuration on top of every other source.
    pub fn merge(mut self, config: SwitchboardConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads and validates the configuration without building anything.
    pub fn load_config(self) -> RuntimeResult<SwitchboardConfig> {
        let config = self.config_loader.load()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Builds the runtime.
    pub async fn build(self) -> RuntimeResult<SwitchboardRuntime> {
        let config = self.load_config()?;
        SwitchboardRuntime::from_config(config).await
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
