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

//! # pdulink Client
//!
//! Async client for switched PDUs speaking a line-oriented console protocol
//! over a persistent TCP connection.
//!
//! ## Features
//!
//! - **Supervised Session** - One background task owns the connection and
//!   runs the connect, login, poll, reconnect lifecycle
//! - **Automatic Reconnection** - Transport failures reconnect after a fixed
//!   delay, forever; login failures are bounded and end in a dormant session
//! - **Polling Reconciliation** - Periodic full status queries keep a cached
//!   outlet registry converged with the device
//! - **Change Notifications** - Subscribers get a replay of the current state
//!   followed by live power transitions
//! - **Async-First** - Built on Tokio
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdulink_client::{DeviceConfig, PduClient, PowerEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DeviceConfig::new("10.0.0.20", "admin", "secret")
//!         .with_name("rack-pdu");
//!     let client = PduClient::connect(config);
//!
//!     let mut states = client.state_changes();
//!     while !states.borrow_and_update().is_ready() {
//!         states.changed().await?;
//!     }
//!
//!     let outlet = client.set_power(3, true).await?;
//!     println!("{} is now {}", outlet.name, if outlet.on { "on" } else { "off" });
//!
//!     let mut events = client.subscribe_power().await?;
//!     while let Some(PowerEvent::Change(change)) = events.next().await {
//!         println!("outlet {} -> {}", change.outlet, change.on);
//!     }
//!
//!     client.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod config;
mod dispatcher;
mod error;
mod events;
mod registry;
mod supervisor;
mod transport;

pub use auth::{AuthSequencer, AuthState};
pub use client::PduClient;
pub use config::DeviceConfig;
pub use dispatcher::{CommandDispatcher, CommandQueue, PendingCommand};
pub use error::{DeviceError, Result};
pub use events::{PowerChange, PowerEvent, PowerEvents};
pub use registry::{Outlet, OutletRegistry};
pub use supervisor::SessionState;
pub use transport::LineTransport;

// Re-export types from pdulink_protocol
pub use pdulink_protocol::{
    Command, LineCodec, OutletRecord, ProtocolError, ProtocolResult, TableReport, consts,
    find_outlet, parse_outlet_table, parse_row, strip_chrome,
};
