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

//! # pdulink Protocol Layer
//!
//! Pure, socket-free implementation of the line-oriented text protocol spoken
//! by networked power-distribution units. The device exposes a telnet-style
//! console on TCP port 23 with no framing and no structured acknowledgements;
//! everything the client knows, it learns by scraping text.
//!
//! ## Core Components
//!
//! ### [`Command`]
//!
//! The outgoing command set: the `login` handshake steps, `pshow` (dump the
//! outlet table), `pset <n> <0|1>` (set outlet power), `prb <n>` (reboot an
//! outlet) and `logout`. Every command is rendered as ASCII text terminated
//! with `\r\n`.
//!
//! ### [`parse_outlet_table`]
//!
//! Turns a raw multi-line response blob into structured [`OutletRecord`]s.
//! The device wraps its table in banner separators, column headers, echoed
//! command names and prompts; the parser strips that chrome and parses the
//! surviving `<num> | <name> | <ON|OFF> | ...` rows. A malformed surviving row
//! is reported as skipped, never as a fatal error; partial data is better
//! than none.
//!
//! ### [`LineCodec`]
//!
//! A `tokio_util` codec pairing command encoding with chunked text decoding.
//! Because the protocol has no message framing, the decoder yields whatever
//! bytes are currently buffered as one text chunk; "end of response" is a
//! transport-level quiet-window decision, not a codec decision.
//!
//! ## Determinism
//!
//! Every function in this crate is pure and synchronous: identical input text
//! always yields identical output, so the whole protocol layer is unit-tested
//! without a socket in sight.

#![warn(missing_docs, future_incompatible, rust_2018_idioms)]

pub mod consts;

mod codec;
mod command;
mod parser;
mod record;
mod result;

pub use self::codec::LineCodec;
pub use self::command::Command;
pub use self::parser::{find_outlet, parse_outlet_table, parse_row, strip_chrome};
pub use self::record::{OutletRecord, TableReport};
pub use self::result::{ProtocolError, ProtocolResult};
