//! Operations context for dependency injection

use crate::build::{BuildDriver, CommandDriver};
use autospec_config::Config;
use autospec_errors::Error;
use autospec_events::{EventEmitter, EventSender};
use autospec_net::{NetClient, NetConfig};
use autospec_providers::{SystemRunner, ToolRunner};
use std::sync::Arc;

/// Everything an operation needs: transfer client, subprocess runner,
/// build driver, event channel and configuration
pub struct OpsCtx {
    /// Network client
    pub net: NetClient,
    /// Runs external metadata tools
    pub runner: Arc<dyn ToolRunner>,
    /// External build driver
    pub driver: Arc<dyn BuildDriver>,
    /// Event sender for user-visible messages
    pub tx: EventSender,
    /// Merged configuration
    pub config: Config,
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

/// Builder for [`OpsCtx`]
#[derive(Default)]
pub struct OpsContextBuilder {
    net: Option<NetClient>,
    runner: Option<Arc<dyn ToolRunner>>,
    driver: Option<Arc<dyn BuildDriver>>,
    tx: Option<EventSender>,
    config: Option<Config>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set network client
    #[must_use]
    pub fn with_net(mut self, net: NetClient) -> Self {
        self.net = Some(net);
        self
    }

    /// Set the subprocess runner
    #[must_use]
    pub fn with_runner(mut self, runner: Arc<dyn ToolRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Set the build driver
    #[must_use]
    pub fn with_driver(mut self, driver: Arc<dyn BuildDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the context.
    ///
    /// Missing parts default to: a client built from the network config,
    /// the system runner, and a driver running the configured build command.
    ///
    /// # Errors
    ///
    /// Returns an error if no event sender was set or the HTTP client cannot
    /// be created.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let tx = self
            .tx
            .ok_or_else(|| Error::internal("event sender is required"))?;
        let config = self.config.unwrap_or_default();

        let net = match self.net {
            Some(net) => net,
            None => NetClient::new(NetConfig::from(&config.network))?,
        };
        let runner = self
            .runner
            .unwrap_or_else(|| Arc::new(SystemRunner) as Arc<dyn ToolRunner>);
        let driver = self.driver.unwrap_or_else(|| {
            Arc::new(CommandDriver::new(
                config.build.command.clone(),
                Arc::clone(&runner),
            )) as Arc<dyn BuildDriver>
        });

        Ok(OpsCtx {
            net,
            runner,
            driver,
            tx,
            config,
        })
    }
}
