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

//! Line transport over the device's TCP console.
//!
//! Owns the raw socket and frames bytes into text chunks. All retry policy
//! lives in the supervisor; the transport reports every failure and never
//! silently retries.

use crate::config::DeviceConfig;
use crate::error::{DeviceError, Result};
use futures::{SinkExt, StreamExt};
use pdulink_protocol::{Command, LineCodec};
use std::time::Duration;
use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, trace};

/// A connected console transport.
pub struct LineTransport {
    reader: FramedRead<ReadHalf<TcpStream>, LineCodec>,
    writer: FramedWrite<WriteHalf<TcpStream>, LineCodec>,
    send_timeout: Duration,
    device: String,
}

impl LineTransport {
    /// Open a TCP connection to the device console.
    pub async fn connect(config: &DeviceConfig) -> Result<LineTransport> {
        let addr = config.address();
        let stream = match timeout(config.connect_timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(DeviceError::ConnectTimeout),
        };
        debug!(device = %config.name, %addr, "connected");

        let (read_half, write_half) = tokio::io::split(stream);
        Ok(LineTransport {
            reader: FramedRead::with_capacity(read_half, LineCodec::new(), config.buffer_size),
            writer: FramedWrite::new(write_half, LineCodec::new()),
            send_timeout: config.send_timeout,
            device: config.name.clone(),
        })
    }

    /// Send one command, bounded by the configured send timeout.
    pub async fn send(&mut self, command: Command) -> Result<()> {
        trace!(device = %self.device, ?command, "send");
        match timeout(self.send_timeout, self.writer.send(command)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(DeviceError::SendTimeout),
        }
    }

    /// Collect everything currently buffered plus anything arriving within
    /// `quiet` of the last byte.
    ///
    /// The protocol has no framing, so a quiet window is the only available
    /// definition of "end of this response chunk". The wait is a timed await
    /// on the socket, never a spin.
    pub async fn receive_available(&mut self, quiet: Duration) -> Result<String> {
        let mut collected = String::new();
        loop {
            match timeout(quiet, self.reader.next()).await {
                Ok(Some(Ok(chunk))) => collected.push_str(&chunk),
                Ok(Some(Err(e))) => return Err(e.into()),
                Ok(None) => return Err(DeviceError::ConnectionClosed),
                Err(_) => {
                    trace!(
                        device = %self.device,
                        bytes = collected.len(),
                        "quiet window elapsed"
                    );
                    return Ok(collected);
                }
            }
        }
    }

    /// Close the transport, flushing any pending write.
    pub async fn close(mut self) {
        let _ = self.writer.close().await;
        debug!(device = %self.device, "transport closed");
    }
}

impl std::fmt::Debug for LineTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineTransport")
            .field("device", &self.device)
            .field("send_timeout", &self.send_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn connect_pair(config: &mut DeviceConfig) -> (LineTransport, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        config.host = addr.ip().to_string();
        config.port = addr.port();

        let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });
        let transport = LineTransport::connect(config).await.unwrap();
        (transport, accept.await.unwrap())
    }

    #[tokio::test]
    async fn send_writes_terminated_command() {
        let mut config = DeviceConfig::default();
        let (mut transport, mut peer) = connect_pair(&mut config).await;

        transport.send(Command::Show).await.unwrap();
        let mut buf = [0u8; 16];
        let n = peer.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"pshow\r\n");
    }

    #[tokio::test]
    async fn receive_collects_across_gaps_shorter_than_quiet() {
        let mut config = DeviceConfig::default();
        let (mut transport, mut peer) = connect_pair(&mut config).await;

        tokio::spawn(async move {
            peer.write_all(b"first ").await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            peer.write_all(b"second").await.unwrap();
            // Keep the peer open past the quiet window.
            tokio::time::sleep(Duration::from_millis(500)).await;
        });

        let blob = transport
            .receive_available(Duration::from_millis(150))
            .await
            .unwrap();
        assert_eq!(blob, "first second");
    }

    #[tokio::test]
    async fn receive_reports_peer_close() {
        let mut config = DeviceConfig::default();
        let (mut transport, peer) = connect_pair(&mut config).await;
        drop(peer);

        let err = transport
            .receive_available(Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, DeviceError::ConnectionClosed));
    }

    #[tokio::test]
    async fn connect_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = DeviceConfig {
            host: addr.ip().to_string(),
            port: addr.port(),
            ..DeviceConfig::default().with_connect_timeout(Duration::from_millis(500))
        };
        let err = LineTransport::connect(&config).await.unwrap_err();
        assert!(err.is_recoverable());
    }
}
