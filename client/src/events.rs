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

//! Power-change notification stream.
//!
//! Subscriptions follow a replay-then-stream contract: on subscribe, the
//! current cached state of every known outlet is delivered synchronously as
//! initial events, then subsequent changes stream as they happen.

use crate::registry::Outlet;
use std::collections::VecDeque;
use tokio::sync::broadcast;

/// One observed power-state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerChange {
    /// Outlet id.
    pub outlet: u32,
    /// Outlet display name at the time of the change.
    pub name: String,
    /// New power state.
    pub on: bool,
}

/// An event delivered to power subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PowerEvent {
    /// A state transition (or, during replay, the current cached state).
    Change(PowerChange),
    /// The subscriber fell behind and missed events; the local view may be
    /// stale and should be refreshed with a full outlet listing.
    Resync,
}

/// A power-change subscription.
///
/// Yields the replayed snapshot first, then live changes. Returns `None` once
/// the session worker is gone.
#[derive(Debug)]
pub struct PowerEvents {
    replay: VecDeque<PowerChange>,
    rx: broadcast::Receiver<PowerChange>,
}

impl PowerEvents {
    pub(crate) fn new(snapshot: Vec<Outlet>, rx: broadcast::Receiver<PowerChange>) -> Self {
        let replay = snapshot
            .into_iter()
            .map(|outlet| PowerChange {
                outlet: outlet.id,
                name: outlet.name,
                on: outlet.on,
            })
            .collect();
        Self { replay, rx }
    }

    /// Receive the next event.
    pub async fn next(&mut self) -> Option<PowerEvent> {
        if let Some(change) = self.replay.pop_front() {
            return Some(PowerEvent::Change(change));
        }
        match self.rx.recv().await {
            Ok(change) => Some(PowerEvent::Change(change)),
            Err(broadcast::error::RecvError::Lagged(_)) => Some(PowerEvent::Resync),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outlet(id: u32, name: &str, on: bool) -> Outlet {
        Outlet {
            id,
            name: name.to_string(),
            on,
        }
    }

    #[tokio::test]
    async fn replay_precedes_live_events() {
        let (tx, rx) = broadcast::channel(8);
        let mut events = PowerEvents::new(vec![outlet(1, "Lamp", true)], rx);

        tx.send(PowerChange {
            outlet: 1,
            name: "Lamp".to_string(),
            on: false,
        })
        .unwrap();

        let first = events.next().await.unwrap();
        assert_eq!(
            first,
            PowerEvent::Change(PowerChange {
                outlet: 1,
                name: "Lamp".to_string(),
                on: true,
            })
        );
        let second = events.next().await.unwrap();
        assert_eq!(
            second,
            PowerEvent::Change(PowerChange {
                outlet: 1,
                name: "Lamp".to_string(),
                on: false,
            })
        );
    }

    #[tokio::test]
    async fn closed_channel_ends_stream() {
        let (tx, rx) = broadcast::channel::<PowerChange>(8);
        let mut events = PowerEvents::new(Vec::new(), rx);
        drop(tx);
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn lag_surfaces_as_resync() {
        let (tx, rx) = broadcast::channel(1);
        let mut events = PowerEvents::new(Vec::new(), rx);
        for n in 0..3 {
            tx.send(PowerChange {
                outlet: n,
                name: format!("o{}", n),
                on: true,
            })
            .unwrap();
        }
        assert_eq!(events.next().await, Some(PowerEvent::Resync));
    }
}
