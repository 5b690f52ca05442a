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

//! Login handshake sequencer.
//!
//! The device gives no structured acknowledgements, so the handshake is a
//! strict linear state machine driven by substring markers in accumulated
//! transport output. Each step sends one command, waits out the settle
//! window, and inspects whatever arrived.

use crate::config::DeviceConfig;
use crate::dispatcher::CommandDispatcher;
use crate::error::{DeviceError, Result};
use crate::transport::LineTransport;
use pdulink_protocol::{Command, consts};
use tracing::{debug, info};

/// Progress of the login handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Transport is up, nothing sent yet.
    Connected,
    /// Blank line sent, watching for the console prompt.
    AwaitingPrompt,
    /// `login` sent, watching for the username prompt.
    AwaitingUserPrompt,
    /// Username sent, watching for the password prompt.
    AwaitingPasswordPrompt,
    /// Password sent, watching for the result.
    AwaitingResult,
    /// Handshake complete.
    Authenticated,
    /// A marker never arrived; the attempt is over.
    Failed,
}

/// Drives the login handshake over an already-connected transport.
#[derive(Debug)]
pub struct AuthSequencer {
    state: AuthState,
}

impl AuthSequencer {
    /// Create a sequencer for a fresh connection.
    pub fn new() -> Self {
        Self {
            state: AuthState::Connected,
        }
    }

    /// Current handshake state.
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Run the handshake to completion.
    ///
    /// On success the session is logged in and the console sits at its
    /// prompt. On failure the returned error names the marker that never
    /// arrived; transport failures propagate unchanged.
    pub async fn run(
        &mut self,
        transport: &mut LineTransport,
        dispatcher: &mut CommandDispatcher,
        config: &DeviceConfig,
    ) -> Result<()> {
        self.state = AuthState::AwaitingPrompt;
        let mut buffer = dispatcher
            .exchange(transport, Command::Blank, true)
            .await?;
        if !buffer.contains(consts::PROMPT) {
            // Device quirk: sometimes an extra keystroke is needed before the
            // console surfaces its prompt.
            debug!(device = %config.name, "no prompt yet, sending extra blank line");
            let more = dispatcher.exchange(transport, Command::Blank, true).await?;
            buffer.push_str(&more);
        }
        if !buffer.contains(consts::PROMPT) {
            return self.fail(config, consts::PROMPT);
        }

        self.state = AuthState::AwaitingUserPrompt;
        let buffer = dispatcher.exchange(transport, Command::Login, true).await?;
        if !buffer.contains(consts::USERNAME_PROMPT) {
            return self.fail(config, consts::USERNAME_PROMPT);
        }

        self.state = AuthState::AwaitingPasswordPrompt;
        let buffer = dispatcher
            .exchange(transport, Command::Username(config.username.clone()), true)
            .await?;
        if !buffer.contains(consts::PASSWORD_PROMPT) {
            return self.fail(config, consts::PASSWORD_PROMPT);
        }

        self.state = AuthState::AwaitingResult;
        let buffer = dispatcher
            .exchange(transport, Command::Password(config.password.clone()), true)
            .await?;
        if !buffer.contains(consts::LOGIN_SUCCESS) {
            return self.fail(config, consts::LOGIN_SUCCESS);
        }

        self.state = AuthState::Authenticated;
        info!(device = %config.name, "logged in");
        Ok(())
    }

    fn fail(&mut self, config: &DeviceConfig, marker: &'static str) -> Result<()> {
        self.state = AuthState::Failed;
        debug!(device = %config.name, marker, "handshake marker not observed");
        Err(DeviceError::HandshakeMarker(marker))
    }
}

impl Default for AuthSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Scripted device console: replies to each received command per the fixed
    /// handshake, optionally withholding the prompt until the second blank
    /// line and optionally rejecting the password. Every received command is
    /// recorded, terminator stripped.
    async fn scripted_console(
        mut sock: TcpStream,
        prompt_on_blank: usize,
        accept_login: bool,
        sends: Arc<Mutex<Vec<String>>>,
    ) {
        let mut blanks = 0usize;
        let mut buf = vec![0u8; 1024];
        loop {
            let n = match sock.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            let received = String::from_utf8_lossy(&buf[..n]).to_string();
            sends
                .lock()
                .unwrap()
                .push(received.trim_end_matches("\r\n").to_string());
            let reply: &str = if received == "\r\n" {
                blanks += 1;
                if blanks >= prompt_on_blank {
                    "\r\n> "
                } else {
                    continue;
                }
            } else if received == "login\r\n" {
                "\r\nuser name:"
            } else if received == "admin\r\n" {
                "\r\npassword:"
            } else if received == "secret\r\n" {
                if accept_login {
                    "\r\nlogin success\r\n> "
                } else {
                    "\r\nlogin failed\r\n> "
                }
            } else {
                continue;
            };
            if sock.write_all(reply.as_bytes()).await.is_err() {
                return;
            }
        }
    }

    async fn handshake_fixture(
        prompt_on_blank: usize,
        accept_login: bool,
    ) -> (
        LineTransport,
        CommandDispatcher,
        DeviceConfig,
        Arc<Mutex<Vec<String>>>,
    ) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let sends = Arc::new(Mutex::new(Vec::new()));
        let console_sends = sends.clone();
        tokio::spawn(async move {
            let (sock, _) = listener.accept().await.unwrap();
            scripted_console(sock, prompt_on_blank, accept_login, console_sends).await;
        });

        let config = DeviceConfig {
            host: addr.ip().to_string(),
            port: addr.port(),
            ..DeviceConfig::new("", "admin", "secret")
                .with_settle_time(Duration::from_millis(50))
        };
        let transport = LineTransport::connect(&config).await.unwrap();
        let dispatcher = CommandDispatcher::new(config.settle_time);
        (transport, dispatcher, config, sends)
    }

    #[tokio::test]
    async fn happy_path_reaches_authenticated_in_four_sends() {
        let (mut transport, mut dispatcher, config, sends) = handshake_fixture(1, true).await;
        let mut sequencer = AuthSequencer::new();
        sequencer
            .run(&mut transport, &mut dispatcher, &config)
            .await
            .unwrap();
        assert_eq!(sequencer.state(), AuthState::Authenticated);
        // Exactly four sends crossed the wire, in handshake order.
        assert_eq!(*sends.lock().unwrap(), ["", "login", "admin", "secret"]);
        // Every handshake send was matched to a response blob.
        assert!(dispatcher.queue().is_empty());
    }

    #[tokio::test]
    async fn prompt_on_second_blank_still_authenticates() {
        let (mut transport, mut dispatcher, config, _) = handshake_fixture(2, true).await;
        let mut sequencer = AuthSequencer::new();
        sequencer
            .run(&mut transport, &mut dispatcher, &config)
            .await
            .unwrap();
        assert_eq!(sequencer.state(), AuthState::Authenticated);
    }

    #[tokio::test]
    async fn rejected_password_fails_on_result_marker() {
        let (mut transport, mut dispatcher, config, _) = handshake_fixture(1, false).await;
        let mut sequencer = AuthSequencer::new();
        let err = sequencer
            .run(&mut transport, &mut dispatcher, &config)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeviceError::HandshakeMarker(marker) if marker == consts::LOGIN_SUCCESS
        ));
        assert_eq!(sequencer.state(), AuthState::Failed);
    }

    #[tokio::test]
    async fn silent_console_fails_on_prompt_marker() {
        // prompt_on_blank high enough that the console never answers.
        let (mut transport, mut dispatcher, config, _) = handshake_fixture(99, true).await;
        let mut sequencer = AuthSequencer::new();
        let err = sequencer
            .run(&mut transport, &mut dispatcher, &config)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeviceError::HandshakeMarker(marker) if marker == consts::PROMPT
        ));
        // Two blank lines went out and neither was answered.
        assert_eq!(dispatcher.queue().len(), 2);
    }
}
