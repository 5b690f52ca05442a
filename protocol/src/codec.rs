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

//! Tokio codec for the unframed device console.

use crate::command::Command;
use crate::result::ProtocolError;
use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Codec pairing [`Command`] encoding with chunked text decoding.
///
/// The console protocol has no message framing, so the decoder cannot know
/// where a response ends; it yields whatever bytes are buffered as one UTF-8
/// chunk (lossy: the device occasionally emits stray high bytes in its
/// banner). Deciding that a response is complete is the transport's job, via
/// its quiet-window receive.
#[derive(Debug, Default, Clone)]
pub struct LineCodec {
    _private: (),
}

impl LineCodec {
    /// Create a new codec instance.
    pub fn new() -> LineCodec {
        LineCodec::default()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        if src.is_empty() {
            return Ok(None);
        }
        let chunk = src.split();
        Ok(Some(String::from_utf8_lossy(&chunk).into_owned()))
    }
}

impl Encoder<Command> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, command: Command, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let wire = command.wire();
        dst.reserve(wire.len());
        dst.put_slice(wire.as_bytes());
        Ok(())
    }
}
