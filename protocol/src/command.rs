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

//! Outgoing command set of the device console.

use crate::consts;
use std::fmt;

/// A command understood by the device console.
///
/// `Display` renders the exact wire text without the terminator; use
/// [`Command::wire`] for the terminated form that goes on the socket.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// A bare line feed, used to coax the console into showing its prompt.
    Blank,
    /// Start the login handshake.
    Login,
    /// The configured account name, sent in reply to the username prompt.
    Username(String),
    /// The configured password, sent in reply to the password prompt.
    Password(String),
    /// Dump the outlet state table (`pshow`).
    Show,
    /// Set the power state of one outlet (`pset <n> <0|1>`).
    SetPower {
        /// Outlet id as reported by the device.
        outlet: u32,
        /// Desired power state.
        on: bool,
    },
    /// Power-cycle one outlet (`prb <n>`).
    Reboot {
        /// Outlet id as reported by the device.
        outlet: u32,
    },
    /// End the session.
    Logout,
}

impl Command {
    /// Render the command as wire text, terminated with `\r\n`.
    pub fn wire(&self) -> String {
        format!("{}{}", self, consts::LINE_TERMINATOR)
    }

    /// Whether the command carries a credential that must not reach logs.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Command::Password(_))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Blank => Ok(()),
            Command::Login => write!(f, "login"),
            Command::Username(name) => write!(f, "{}", name),
            Command::Password(secret) => write!(f, "{}", secret),
            Command::Show => write!(f, "pshow"),
            Command::SetPower { outlet, on } => {
                write!(f, "pset {} {}", outlet, if *on { 1 } else { 0 })
            }
            Command::Reboot { outlet } => write!(f, "prb {}", outlet),
            Command::Logout => write!(f, "logout"),
        }
    }
}

// Hand-written so a debug-logged command never exposes the password.
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Blank => write!(f, "Blank"),
            Command::Login => write!(f, "Login"),
            Command::Username(name) => f.debug_tuple("Username").field(name).finish(),
            Command::Password(_) => write!(f, "Password(<redacted>)"),
            Command::Show => write!(f, "Show"),
            Command::SetPower { outlet, on } => f
                .debug_struct("SetPower")
                .field("outlet", outlet)
                .field("on", on)
                .finish(),
            Command::Reboot { outlet } => {
                f.debug_struct("Reboot").field("outlet", outlet).finish()
            }
            Command::Logout => write!(f, "Logout"),
        }
    }
}
