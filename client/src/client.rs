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

//! Public client handle.
//!
//! [`PduClient`] is a cheap cloneable handle to the supervisor task. Every
//! operation is a control message with a oneshot reply, so callers on any
//! task share one serialized device session.

use crate::config::DeviceConfig;
use crate::error::{DeviceError, Result};
use crate::events::PowerEvents;
use crate::registry::Outlet;
use crate::supervisor::{ControlMessage, SessionState, Supervisor};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

const CONTROL_CHANNEL_DEPTH: usize = 32;
const POWER_CHANNEL_DEPTH: usize = 64;

/// Handle to one supervised PDU session.
#[derive(Debug, Clone)]
pub struct PduClient {
    control_tx: mpsc::Sender<ControlMessage>,
    state_rx: watch::Receiver<SessionState>,
}

impl PduClient {
    /// Spawn a supervised session for the device and return its handle.
    ///
    /// Returns immediately; connection and login proceed in the background.
    /// Watch [`PduClient::state_changes`] to observe the session coming up.
    pub fn connect(config: DeviceConfig) -> PduClient {
        let (control_tx, control_rx) = mpsc::channel(CONTROL_CHANNEL_DEPTH);
        let (state_tx, state_rx) = watch::channel(SessionState::Disconnected);
        let (power_tx, _) = broadcast::channel(POWER_CHANNEL_DEPTH);
        let supervisor = Supervisor::new(config, control_rx, state_tx, power_tx);
        tokio::spawn(supervisor.run());
        PduClient {
            control_tx,
            state_rx,
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Watch channel delivering every session state transition.
    pub fn state_changes(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Switch an outlet on or off and verify against the device.
    ///
    /// Returns the outlet as reported by the follow-up status query, which is
    /// authoritative over the optimistic command. Rejected immediately when
    /// the session is not ready; commands are never queued for later.
    pub async fn set_power(&self, outlet: u32, on: bool) -> Result<Outlet> {
        self.ensure_ready()?;
        let (reply, rx) = oneshot::channel();
        self.send(ControlMessage::SetPower { outlet, on, reply })
            .await?;
        rx.await.map_err(|_| DeviceError::Shutdown)?
    }

    /// Power-cycle an outlet and verify against the device.
    pub async fn reboot(&self, outlet: u32) -> Result<Outlet> {
        self.ensure_ready()?;
        let (reply, rx) = oneshot::channel();
        self.send(ControlMessage::Reboot { outlet, reply }).await?;
        rx.await.map_err(|_| DeviceError::Shutdown)?
    }

    /// Last known view of all discovered outlets, in id order.
    ///
    /// Served from the cached registry, so it works while disconnected and
    /// may lag the device by up to one poll interval.
    pub async fn list_outlets(&self) -> Result<Vec<Outlet>> {
        let (reply, rx) = oneshot::channel();
        self.send(ControlMessage::ListOutlets { reply }).await?;
        rx.await.map_err(|_| DeviceError::Shutdown)
    }

    /// Subscribe to power-state changes.
    ///
    /// The stream replays the current state of every known outlet first, then
    /// delivers live transitions.
    pub async fn subscribe_power(&self) -> Result<PowerEvents> {
        let (reply, rx) = oneshot::channel();
        self.send(ControlMessage::Subscribe { reply }).await?;
        rx.await.map_err(|_| DeviceError::Shutdown)
    }

    /// Log out, close the connection and stop the supervisor task.
    ///
    /// Idempotent: shutting down an already-terminated session is not an
    /// error.
    pub async fn shutdown(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        if self
            .control_tx
            .send(ControlMessage::Shutdown { reply })
            .await
            .is_err()
        {
            return Ok(());
        }
        let _ = rx.await;
        Ok(())
    }

    async fn send(&self, msg: ControlMessage) -> Result<()> {
        self.control_tx
            .send(msg)
            .await
            .map_err(|_| DeviceError::Shutdown)
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state() {
            SessionState::Ready => Ok(()),
            SessionState::Terminated => Err(DeviceError::Terminated),
            _ => Err(DeviceError::NotConnected),
        }
    }
}
