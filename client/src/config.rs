//
// Copyright 2024-2026 the pdulink contributors. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Device session configuration

use std::time::Duration;

/// Configuration for one PDU session.
///
/// Credentials are always configuration-supplied; the library carries no
/// built-in account.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Device display name, used as log context on every message.
    pub name: String,

    /// Device hostname or IP address
    pub host: String,

    /// Device console port
    pub port: u16,

    /// Account name for the login handshake
    pub username: String,

    /// Password for the login handshake
    pub password: String,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Send timeout for a single command write
    pub send_timeout: Duration,

    /// Settle window: the console is unframed, so "no more bytes for this
    /// long" is treated as "end of this response chunk".
    pub settle_time: Duration,

    /// Period of the background outlet-state poll
    pub poll_interval: Duration,

    /// Delay before a reconnect attempt after a transport failure
    pub reconnect_delay: Duration,

    /// Delay before retrying a failed login handshake
    pub login_retry_delay: Duration,

    /// Failed handshakes tolerated before the session goes dormant
    pub max_login_attempts: u32,

    /// Receive buffer size; sized for the largest expected `pshow` table
    pub buffer_size: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: "pdu".to_string(),
            host: "localhost".to_string(),
            port: 23,
            username: String::new(),
            password: String::new(),
            connect_timeout: Duration::from_secs(10),
            send_timeout: Duration::from_secs(20),
            settle_time: Duration::from_millis(250),
            poll_interval: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(30),
            login_retry_delay: Duration::from_secs(5),
            max_login_attempts: 5,
            buffer_size: 16384,
        }
    }
}

impl DeviceConfig {
    /// Create a configuration for the given device and account.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Set the device display name used in logs
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the console port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the send timeout
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set the settle window
    pub fn with_settle_time(mut self, settle: Duration) -> Self {
        self.settle_time = settle;
        self
    }

    /// Set the poll period
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the reconnect delay
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Set the login retry delay
    pub fn with_login_retry_delay(mut self, delay: Duration) -> Self {
        self.login_retry_delay = delay;
        self
    }

    /// Set the bound on failed login handshakes
    pub fn with_max_login_attempts(mut self, attempts: u32) -> Self {
        self.max_login_attempts = attempts;
        self
    }

    /// Get the device address as a string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_device_expectations() {
        let config = DeviceConfig::default();
        assert_eq!(config.port, 23);
        assert_eq!(config.send_timeout, Duration::from_secs(20));
        assert_eq!(config.settle_time, Duration::from_millis(250));
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.max_login_attempts, 5);
        assert_eq!(config.buffer_size, 16384);
    }

    #[test]
    fn builder_overrides() {
        let config = DeviceConfig::new("10.0.0.8", "admin", "secret")
            .with_name("rack-pdu")
            .with_port(2323)
            .with_settle_time(Duration::from_millis(50));
        assert_eq!(config.address(), "10.0.0.8:2323");
        assert_eq!(config.name, "rack-pdu");
        assert_eq!(config.settle_time, Duration::from_millis(50));
    }
}
