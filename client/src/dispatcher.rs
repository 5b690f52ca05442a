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

//! Command dispatch and pending-command tracking.
//!
//! The console is synchronous request/response over a single connection; the
//! dispatcher is the sole send/receive path, so two exchanges can never
//! interleave on the shared stream. The supervisor task owns the dispatcher,
//! which is what keeps a poll tick from racing an in-flight manual command.

use crate::error::Result;
use crate::transport::LineTransport;
use pdulink_protocol::Command;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// A command sent but not yet matched to a received response blob.
#[derive(Debug, Clone)]
pub struct PendingCommand {
    /// Wire text of the command, without the terminator.
    pub text: String,
    /// When the command was enqueued.
    pub sent_at: Instant,
}

/// FIFO of sent-but-unacknowledged commands.
///
/// The protocol has no correlation ids; a command is dequeued on receipt of
/// the next readable response blob, not on content match. Invariant: the
/// queue length equals the number of commands sent but not yet matched.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<PendingCommand>,
}

impl CommandQueue {
    /// Record a sent command.
    pub fn push(&mut self, command: &Command) {
        self.pending.push_back(PendingCommand {
            text: command.to_string(),
            sent_at: Instant::now(),
        });
    }

    /// Match the oldest outstanding command to a received response.
    pub fn acknowledge(&mut self) -> Option<PendingCommand> {
        self.pending.pop_front()
    }

    /// Number of outstanding commands.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when every send has been matched to a response.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop all outstanding commands, e.g. on transport teardown.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Serialized send/receive exchange over one transport.
#[derive(Debug)]
pub struct CommandDispatcher {
    queue: CommandQueue,
    settle: Duration,
}

impl CommandDispatcher {
    /// Create a dispatcher with the configured settle window.
    pub fn new(settle: Duration) -> Self {
        Self {
            queue: CommandQueue::default(),
            settle,
        }
    }

    /// Outstanding-command queue, exposed for handshake bookkeeping.
    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Send a command and collect the response that settles in behind it.
    ///
    /// With `expect_queued_ack` the command is tracked in the pending queue
    /// and matched off against the next readable response blob; the login
    /// handshake uses this to count outstanding replies. Outlet-control
    /// commands pass `false`: their acknowledgement is an explicit follow-up
    /// status query, not queue tracking.
    pub async fn exchange(
        &mut self,
        transport: &mut LineTransport,
        command: Command,
        expect_queued_ack: bool,
    ) -> Result<String> {
        if expect_queued_ack {
            self.queue.push(&command);
        }
        transport.send(command).await?;
        let response = transport.receive_available(self.settle).await?;
        if expect_queued_ack && !response.is_empty() {
            self.queue.acknowledge();
        }
        Ok(response)
    }

    /// Forget any outstanding commands after a transport teardown.
    pub fn reset(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_fifo() {
        let mut queue = CommandQueue::default();
        queue.push(&Command::Login);
        queue.push(&Command::Show);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.acknowledge().unwrap().text, "login");
        assert_eq!(queue.acknowledge().unwrap().text, "pshow");
        assert!(queue.is_empty());
        assert!(queue.acknowledge().is_none());
    }

    #[test]
    fn clear_drops_outstanding() {
        let mut queue = CommandQueue::default();
        queue.push(&Command::Login);
        queue.clear();
        assert!(queue.is_empty());
    }
}
