/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

use crate::utils::ConfigError;
use std::time::Duration;
use url::Url;

/// Default maximum size of a single line: 64 MiB.
pub const DEFAULT_MAX_LINE_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Default wait between the end of one cycle and the start of the next.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(60);

/// Initial capacity of the line buffer; it grows on demand up to the maximum.
pub const INITIAL_LINE_BUFFER_SIZE: usize = 64 * 1024;

/// Tunables of a [`StreamClient`](crate::client::StreamClient).
///
/// The client takes a snapshot of these at the beginning of every connection
/// attempt, so changes made while it is running apply from the next cycle on.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamOptions {
    max_line_buffer_size: usize,
    reconnect_delay: Duration,
    endpoint: Option<Url>,
    system_proxy: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            max_line_buffer_size: DEFAULT_MAX_LINE_BUFFER_SIZE,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            endpoint: None,
            system_proxy: true,
        }
    }
}

impl StreamOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum size in bytes of a single line, terminator excluded.
    pub fn get_max_line_buffer_size(&self) -> usize {
        self.max_line_buffer_size
    }

    /// Sets the maximum size in bytes of a single line.
    ///
    /// A longer line fails the cycle that received it.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero.
    pub fn set_max_line_buffer_size(&mut self, size: usize) -> Result<(), ConfigError> {
        if size == 0 {
            return Err(ConfigError::InvalidValue {
                option: "max_line_buffer_size",
                reason: "must be greater than 0".to_string(),
            });
        }
        self.max_line_buffer_size = size;
        Ok(())
    }

    /// Delay between the end of a cycle and the next connection attempt.
    pub fn get_reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    /// Sets the delay between the end of a cycle and the next connection attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if `delay` is zero, which would turn a failing endpoint into
    /// a busy loop.
    pub fn set_reconnect_delay(&mut self, delay: Duration) -> Result<(), ConfigError> {
        if delay.is_zero() {
            return Err(ConfigError::InvalidValue {
                option: "reconnect_delay",
                reason: "must be greater than 0".to_string(),
            });
        }
        self.reconnect_delay = delay;
        Ok(())
    }

    /// Base URL used in place of `https://{customer}.{domain}`, if any.
    pub fn get_endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    /// Overrides the origin the stream path is appended to.
    ///
    /// `None` restores the vendor origin derived from the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not an absolute `http`/`https` URL.
    pub fn set_endpoint(&mut self, endpoint: Option<&str>) -> Result<(), ConfigError> {
        let Some(endpoint) = endpoint else {
            self.endpoint = None;
            return Ok(());
        };

        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };
        let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("cannot carry a path".to_string()));
        }
        self.endpoint = Some(url);
        Ok(())
    }

    /// Whether proxy settings from the environment are honoured.
    pub fn get_system_proxy(&self) -> bool {
        self.system_proxy
    }

    /// Enables or disables proxy settings from the environment.
    pub fn set_system_proxy(&mut self, enabled: bool) {
        self.system_proxy = enabled;
    }

    /// Builder-style variant of [`set_max_line_buffer_size`](Self::set_max_line_buffer_size).
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero.
    pub fn with_max_line_buffer_size(mut self, size: usize) -> Result<Self, ConfigError> {
        self.set_max_line_buffer_size(size)?;
        Ok(self)
    }

    /// Builder-style variant of [`set_reconnect_delay`](Self::set_reconnect_delay).
    ///
    /// # Errors
    ///
    /// Returns an error if `delay` is zero.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Result<Self, ConfigError> {
        self.set_reconnect_delay(delay)?;
        Ok(self)
    }

    /// Builder-style variant of [`set_endpoint`](Self::set_endpoint).
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not an absolute `http`/`https` URL.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, ConfigError> {
        self.set_endpoint(Some(endpoint))?;
        Ok(self)
    }

    /// Builder-style variant of [`set_system_proxy`](Self::set_system_proxy).
    #[must_use]
    pub fn with_system_proxy(mut self, enabled: bool) -> Self {
        self.system_proxy = enabled;
        self
    }
}
