//! Gateway configuration.
//!
//! Configuration is an explicit struct passed at construction; there are
//! no implicit defaults shared across instances.

use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the HTTP server hosting a gateway.
///
/// # Example
///
/// ```
/// use crossbar_gateway::GatewayConfig;
/// use std::time::Duration;
///
/// let config = GatewayConfig::builder()
///     .bind_addr("0.0.0.0:8080")
///     .shutdown_timeout(Duration::from_secs(60))
///     .build();
///
/// assert_eq!(config.bind_addr(), "0.0.0.0:8080");
/// ```
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to bind the listener to.
    bind_addr: String,

    /// How long to wait for in-flight connections on shutdown.
    shutdown_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl GatewayConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// The configured bind address.
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// The configured bind address parsed as a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.bind_addr.parse()
    }

    /// The graceful-shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }
}

/// Builder for [`GatewayConfig`].
#[derive(Debug, Default)]
pub struct GatewayConfigBuilder {
    bind_addr: Option<String>,
    shutdown_timeout: Option<Duration>,
}

impl GatewayConfigBuilder {
    /// Sets the bind address (e.g. `"0.0.0.0:8080"`).
    #[must_use]
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = Some(addr.into());
        self
    }

    /// Sets the graceful-shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    /// Builds the configuration, filling unset fields with defaults.
    #[must_use]
    pub fn build(self) -> GatewayConfig {
        let defaults = GatewayConfig::default();
        GatewayConfig {
            bind_addr: self.bind_addr.unwrap_or(defaults.bind_addr),
            shutdown_timeout: self.shutdown_timeout.unwrap_or(defaults.shutdown_timeout),
        }
    }
}
