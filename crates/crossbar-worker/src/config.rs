//! Worker configuration.

use std::time::Duration;

/// Configuration for a queue worker.
///
/// # Example
///
/// ```
/// use crossbar_worker::WorkerConfig;
/// use std::time::Duration;
///
/// let config = WorkerConfig::builder()
///     .wait(Duration::from_secs(5))
///     .delete_attempts(3)
///     .build();
///
/// assert_eq!(config.wait(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Long-poll wait passed to the transport's receive.
    wait: Duration,

    /// Cooldown after a transport receive error.
    cooldown: Duration,

    /// Maximum delete attempts per message.
    delete_attempts: u32,

    /// Pause between failed delete attempts.
    delete_pause: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_secs(10),
            cooldown: Duration::from_secs(30),
            delete_attempts: 10,
            delete_pause: Duration::from_secs(1),
        }
    }
}

impl WorkerConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> WorkerConfigBuilder {
        WorkerConfigBuilder::default()
    }

    /// The long-poll wait.
    #[must_use]
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// The receive-error cooldown.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// The maximum delete attempts.
    #[must_use]
    pub fn delete_attempts(&self) -> u32 {
        self.delete_attempts
    }

    /// The pause between failed delete attempts.
    #[must_use]
    pub fn delete_pause(&self) -> Duration {
        self.delete_pause
    }
}

/// Builder for [`WorkerConfig`].
#[derive(Debug, Default)]
pub struct WorkerConfigBuilder {
    wait: Option<Duration>,
    cooldown: Option<Duration>,
    delete_attempts: Option<u32>,
    delete_pause: Option<Duration>,
}

impl WorkerConfigBuilder {
    /// Sets the long-poll wait.
    #[must_use]
    pub fn wait(mut self, wait: Duration) -> Self {
        self.wait = Some(wait);
        self
    }

    /// Sets the receive-error cooldown.
    #[must_use]
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    /// Sets the maximum delete attempts.
    #[must_use]
    pub fn delete_attempts(mut self, attempts: u32) -> Self {
        self.delete_attempts = Some(attempts);
        self
    }

    /// Sets the pause between failed delete attempts.
    #[must_use]
    pub fn delete_pause(mut self, pause: Duration) -> Self {
        self.delete_pause = Some(pause);
        self
    }

    /// Builds the configuration, filling unset fields with defaults.
    #[must_use]
    pub fn build(self) -> WorkerConfig {
        let defaults = WorkerConfig::default();
        WorkerConfig {
            wait: self.wait.unwrap_or(defaults.wait),
            cooldown: self.cooldown.unwrap_or(defaults.cooldown),
            delete_attempts: self.delete_attempts.unwrap_or(defaults.delete_attempts),
            delete_pause: self.delete_pause.unwrap_or(defaults.delete_pause),
        }
    }
}
