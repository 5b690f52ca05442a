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

//! Literal text markers of the device console.
//!
//! The device gives no structured acknowledgements; the client senses protocol
//! state by matching these substrings in accumulated transport output.

/// Console prompt marker. Its presence means the device is ready for a command.
pub const PROMPT: &str = "\r\n> ";

/// Username prompt emitted after the `login` command.
pub const USERNAME_PROMPT: &str = "user name:";

/// Password prompt emitted after the username is accepted.
pub const PASSWORD_PROMPT: &str = "password:";

/// Marker confirming a successful login handshake.
pub const LOGIN_SUCCESS: &str = "login success";

/// Line terminator for every outgoing command.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Field delimiter in outlet-table rows.
pub const FIELD_DELIMITER: char = '|';

/// Power-state literal compared case-sensitively; anything else means off.
pub const STATE_ON: &str = "ON";

/// Substrings identifying decorative or header lines in a `pshow` response.
///
/// A line containing any of these is device chrome (banner separators, column
/// headers, prompts, the echoed command name) and carries no outlet data.
pub const CHROME_MARKERS: &[&str] = &["*******", "*  ", "> ", "Port |", "pshow", "---"];

/// A line consisting of exactly this text is a bare prompt, also chrome.
pub const BARE_PROMPT: &str = ">";
