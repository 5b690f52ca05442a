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

//! Connection supervisor.
//!
//! The supervisor is the single task that owns the transport, the outlet
//! registry and the command dispatcher. It runs the session state machine:
//! connect, authenticate, poll, detect failure, reconnect with delay. All
//! public operations arrive as control messages over one channel, so a poll
//! tick and a manual command can never interleave on the shared stream.
//!
//! Two retry policies coexist and stay separate:
//! - transport failures reconnect after a fixed delay, forever;
//! - login failures are bounded; when the counter runs out the session goes
//!   dormant until shut down.

use crate::auth::AuthSequencer;
use crate::config::DeviceConfig;
use crate::dispatcher::CommandDispatcher;
use crate::error::{DeviceError, Result};
use crate::events::{PowerChange, PowerEvents};
use crate::registry::{Outlet, OutletRegistry};
use crate::transport::LineTransport;
use pdulink_protocol::{Command, find_outlet, parse_outlet_table};
use std::fmt;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Lifecycle state of one device session.
///
/// Owned exclusively by the supervisor; everyone else observes it through a
/// watch channel and never transitions it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport, no attempt in progress.
    Disconnected,
    /// Opening the TCP connection.
    Connecting,
    /// Running the login handshake.
    Authenticating,
    /// Logged in; polling and accepting commands.
    Ready,
    /// Waiting out a delay before the next connection attempt.
    Reconnecting,
    /// Shut down or dormant after exhausting login attempts; no automatic
    /// transitions leave this state.
    Terminated,
}

impl SessionState {
    /// Whether outlet commands are currently accepted.
    pub fn is_ready(self) -> bool {
        self == SessionState::Ready
    }

    /// Whether the session will never reconnect on its own.
    pub fn is_terminal(self) -> bool {
        self == SessionState::Terminated
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Authenticating => write!(f, "authenticating"),
            Self::Ready => write!(f, "ready"),
            Self::Reconnecting => write!(f, "reconnecting"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// Control messages from the public handle to the supervisor task.
#[derive(Debug)]
pub(crate) enum ControlMessage {
    SetPower {
        outlet: u32,
        on: bool,
        reply: oneshot::Sender<Result<Outlet>>,
    },
    Reboot {
        outlet: u32,
        reply: oneshot::Sender<Result<Outlet>>,
    },
    ListOutlets {
        reply: oneshot::Sender<Vec<Outlet>>,
    },
    Subscribe {
        reply: oneshot::Sender<PowerEvents>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Why the ready-state loop returned.
enum ServeExit {
    Shutdown,
    TransportLost,
}

/// How a timed wait ended.
enum WaitOutcome {
    Elapsed,
    Shutdown,
}

/// The session worker. Created by [`crate::PduClient::connect`] and run to
/// completion on its own task.
pub(crate) struct Supervisor {
    config: DeviceConfig,
    control_rx: mpsc::Receiver<ControlMessage>,
    state_tx: watch::Sender<SessionState>,
    power_tx: broadcast::Sender<PowerChange>,
    registry: OutletRegistry,
    dispatcher: CommandDispatcher,
    login_attempts: u32,
}

impl Supervisor {
    pub(crate) fn new(
        config: DeviceConfig,
        control_rx: mpsc::Receiver<ControlMessage>,
        state_tx: watch::Sender<SessionState>,
        power_tx: broadcast::Sender<PowerChange>,
    ) -> Self {
        let dispatcher = CommandDispatcher::new(config.settle_time);
        Self {
            config,
            control_rx,
            state_tx,
            power_tx,
            registry: OutletRegistry::new(),
            dispatcher,
            login_attempts: 0,
        }
    }

    /// Run the session until shutdown or dormancy.
    ///
    /// Every failure path is handled here; nothing in this loop may panic the
    /// task, or the state machine would silently stop forever.
    pub(crate) async fn run(mut self) {
        'session: loop {
            self.set_state(SessionState::Connecting);
            let mut transport = match LineTransport::connect(&self.config).await {
                Ok(transport) => transport,
                Err(error) => {
                    warn!(device = %self.config.name, %error, "connect failed");
                    match self.wait(self.config.reconnect_delay).await {
                        WaitOutcome::Shutdown => break 'session,
                        WaitOutcome::Elapsed => continue 'session,
                    }
                }
            };

            self.set_state(SessionState::Authenticating);
            let mut sequencer = AuthSequencer::new();
            if let Err(error) = sequencer
                .run(&mut transport, &mut self.dispatcher, &self.config)
                .await
            {
                self.dispatcher.reset();
                transport.close().await;
                if error.is_recoverable() {
                    // The transport died mid-handshake; that is a connection
                    // failure, not a login failure, and does not count
                    // against the bounded attempt counter.
                    warn!(device = %self.config.name, %error, "transport lost during login");
                    match self.wait(self.config.reconnect_delay).await {
                        WaitOutcome::Shutdown => break 'session,
                        WaitOutcome::Elapsed => continue 'session,
                    }
                }
                self.login_attempts += 1;
                error!(
                    device = %self.config.name,
                    %error,
                    attempt = self.login_attempts,
                    "login failed"
                );
                if self.login_attempts >= self.config.max_login_attempts {
                    error!(
                        device = %self.config.name,
                        attempts = self.login_attempts,
                        "login attempts exhausted, session dormant"
                    );
                    self.dormant().await;
                    break 'session;
                }
                match self.wait(self.config.login_retry_delay).await {
                    WaitOutcome::Shutdown => break 'session,
                    WaitOutcome::Elapsed => continue 'session,
                }
            }
            self.login_attempts = 0;

            self.set_state(SessionState::Ready);
            match self.serve(&mut transport).await {
                ServeExit::Shutdown => {
                    // Best-effort logout; the device closes the session
                    // either way.
                    let _ = transport.send(Command::Logout).await;
                    transport.close().await;
                    break 'session;
                }
                ServeExit::TransportLost => {
                    self.dispatcher.reset();
                    transport.close().await;
                    match self.wait(self.config.reconnect_delay).await {
                        WaitOutcome::Shutdown => break 'session,
                        WaitOutcome::Elapsed => continue 'session,
                    }
                }
            }
        }

        self.set_state(SessionState::Terminated);
        info!(device = %self.config.name, "session terminated");
    }

    /// Ready-state loop: poll on the interval, serve control messages in
    /// between. The first tick fires immediately, which is the initial full
    /// discovery pass.
    async fn serve(&mut self, transport: &mut LineTransport) -> ServeExit {
        let mut poll = tokio::time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = poll.tick() => {
                    if let Err(error) = self.poll_cycle(transport).await {
                        warn!(device = %self.config.name, %error, "poll cycle failed");
                        if error.is_recoverable() {
                            return ServeExit::TransportLost;
                        }
                    }
                }
                msg = self.control_rx.recv() => {
                    let Some(msg) = msg else {
                        return ServeExit::Shutdown;
                    };
                    match msg {
                        ControlMessage::SetPower { outlet, on, reply } => {
                            let result = self
                                .command_and_verify(transport, Command::SetPower { outlet, on }, outlet)
                                .await;
                            let lost = matches!(&result, Err(e) if e.is_recoverable());
                            let _ = reply.send(result);
                            if lost {
                                return ServeExit::TransportLost;
                            }
                        }
                        ControlMessage::Reboot { outlet, reply } => {
                            let result = self
                                .command_and_verify(transport, Command::Reboot { outlet }, outlet)
                                .await;
                            let lost = matches!(&result, Err(e) if e.is_recoverable());
                            let _ = reply.send(result);
                            if lost {
                                return ServeExit::TransportLost;
                            }
                        }
                        ControlMessage::ListOutlets { reply } => {
                            let _ = reply.send(self.registry.snapshot());
                        }
                        ControlMessage::Subscribe { reply } => {
                            let _ = reply.send(self.subscription());
                        }
                        ControlMessage::Shutdown { reply } => {
                            let _ = reply.send(());
                            return ServeExit::Shutdown;
                        }
                    }
                }
            }
        }
    }

    /// One full discovery/reconciliation pass.
    async fn poll_cycle(&mut self, transport: &mut LineTransport) -> Result<()> {
        let response = self
            .dispatcher
            .exchange(transport, Command::Show, false)
            .await?;
        let report = parse_outlet_table(&response);
        for line in &report.skipped {
            warn!(device = %self.config.name, line = %line, "skipping malformed table row");
        }
        for change in self.registry.reconcile(&report) {
            debug!(
                device = %self.config.name,
                outlet = change.outlet,
                on = change.on,
                "power state changed"
            );
            let _ = self.power_tx.send(change);
        }
        Ok(())
    }

    /// Send an outlet command, then verify by re-querying the table.
    ///
    /// Optimistic-then-verified: the authoritative state is whatever the
    /// follow-up `pshow` reports for this outlet.
    async fn command_and_verify(
        &mut self,
        transport: &mut LineTransport,
        command: Command,
        outlet: u32,
    ) -> Result<Outlet> {
        self.dispatcher.exchange(transport, command, false).await?;
        let response = self
            .dispatcher
            .exchange(transport, Command::Show, false)
            .await?;
        let record =
            find_outlet(&response, outlet).ok_or(DeviceError::UnknownOutlet(outlet))?;
        if let Some(change) = self.registry.apply(&record) {
            let _ = self.power_tx.send(change);
        }
        match self.registry.get(outlet) {
            Some(current) => Ok(current.clone()),
            None => Err(DeviceError::UnknownOutlet(outlet)),
        }
    }

    /// Wait out a delay, answering control messages as not-connected.
    ///
    /// Exactly one such wait exists at a time, so duplicate reconnect timers
    /// cannot be armed concurrently.
    async fn wait(&mut self, delay: Duration) -> WaitOutcome {
        self.set_state(SessionState::Reconnecting);
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return WaitOutcome::Elapsed,
                msg = self.control_rx.recv() => match msg {
                    None => return WaitOutcome::Shutdown,
                    Some(msg) => {
                        if self.answer_offline(msg, false) {
                            return WaitOutcome::Shutdown;
                        }
                    }
                }
            }
        }
    }

    /// Dormant after exhausting login attempts: answer everything as
    /// terminated until the caller shuts the session down.
    async fn dormant(&mut self) {
        self.set_state(SessionState::Terminated);
        while let Some(msg) = self.control_rx.recv().await {
            if self.answer_offline(msg, true) {
                return;
            }
        }
    }

    /// Handle a control message without a transport. Returns true on
    /// shutdown. Snapshots and subscriptions still work offline; commands
    /// are rejected immediately, never queued.
    fn answer_offline(&mut self, msg: ControlMessage, dormant: bool) -> bool {
        let unavailable = || {
            if dormant {
                DeviceError::AuthExhausted {
                    attempts: self.login_attempts,
                }
            } else {
                DeviceError::NotConnected
            }
        };
        match msg {
            ControlMessage::SetPower { reply, .. } | ControlMessage::Reboot { reply, .. } => {
                let _ = reply.send(Err(unavailable()));
                false
            }
            ControlMessage::ListOutlets { reply } => {
                let _ = reply.send(self.registry.snapshot());
                false
            }
            ControlMessage::Subscribe { reply } => {
                let _ = reply.send(self.subscription());
                false
            }
            ControlMessage::Shutdown { reply } => {
                let _ = reply.send(());
                true
            }
        }
    }

    fn subscription(&self) -> PowerEvents {
        PowerEvents::new(self.registry.snapshot(), self.power_tx.subscribe())
    }

    fn set_state(&mut self, state: SessionState) {
        debug!(device = %self.config.name, %state, "session state");
        let _ = self.state_tx.send(state);
    }
}
