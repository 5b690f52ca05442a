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

//! Error types for the PDU session layer

use pdulink_protocol::ProtocolError;
use std::io;
use thiserror::Error;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, DeviceError>;

/// PDU session error types
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Transport failure on the device connection
    #[error("transport error: {0}")]
    Transport(String),

    /// Connection attempt timed out
    #[error("connect timeout")]
    ConnectTimeout,

    /// A command write timed out
    #[error("send timeout")]
    SendTimeout,

    /// Device closed the connection
    #[error("connection closed by device")]
    ConnectionClosed,

    /// A handshake marker was not observed within the settle window
    #[error("login handshake failed: {0:?} not observed")]
    HandshakeMarker(&'static str),

    /// The bounded login-attempt counter ran out
    #[error("authentication failed after {attempts} attempts")]
    AuthExhausted {
        /// Number of handshake cycles attempted.
        attempts: u32,
    },

    /// Malformed data from the protocol layer
    #[error("protocol error: {0}")]
    Protocol(ProtocolError),

    /// A command was issued while the session was not in the ready state
    #[error("not connected")]
    NotConnected,

    /// The device never reported the requested outlet
    #[error("outlet {0} unknown to the device")]
    UnknownOutlet(u32),

    /// The session is terminated and will not reconnect
    #[error("session terminated")]
    Terminated,

    /// The session worker is gone
    #[error("session shut down")]
    Shutdown,
}

impl DeviceError {
    /// Whether the supervisor should tear down the transport and reconnect.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DeviceError::Transport(_)
                | DeviceError::ConnectTimeout
                | DeviceError::SendTimeout
                | DeviceError::ConnectionClosed
        )
    }

    /// Whether the session has reached a state no retry policy will leave.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeviceError::AuthExhausted { .. } | DeviceError::Terminated | DeviceError::Shutdown
        )
    }
}

impl From<io::Error> for DeviceError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::TimedOut => Self::SendTimeout,
            io::ErrorKind::ConnectionReset | io::ErrorKind::BrokenPipe => Self::ConnectionClosed,
            _ => Self::Transport(error.to_string()),
        }
    }
}

impl From<ProtocolError> for DeviceError {
    fn from(error: ProtocolError) -> Self {
        // I/O surfaced through the codec is a transport failure, not bad data.
        match error {
            ProtocolError::IOError { .. } => Self::Transport(error.to_string()),
            ProtocolError::MalformedRow { .. } => Self::Protocol(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_recoverable() {
        assert!(DeviceError::ConnectTimeout.is_recoverable());
        assert!(DeviceError::ConnectionClosed.is_recoverable());
        assert!(DeviceError::SendTimeout.is_recoverable());
        assert!(!DeviceError::NotConnected.is_recoverable());
        assert!(!DeviceError::AuthExhausted { attempts: 5 }.is_recoverable());
    }

    #[test]
    fn terminal_states() {
        assert!(DeviceError::Terminated.is_terminal());
        assert!(DeviceError::AuthExhausted { attempts: 5 }.is_terminal());
        assert!(!DeviceError::Transport("reset".into()).is_terminal());
    }

    #[test]
    fn codec_io_maps_to_transport() {
        let io = ProtocolError::from(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert!(matches!(DeviceError::from(io), DeviceError::Transport(_)));
    }
}
