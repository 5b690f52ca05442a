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

//! Structured results of parsing a device outlet table.

use std::fmt;

/// One parsed outlet-table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutletRecord {
    /// Outlet id, positive and stable for the lifetime of the device.
    pub id: u32,
    /// Display name exactly as the device reports it.
    pub name: String,
    /// Power state; `true` when the state field read `ON`.
    pub on: bool,
}

impl fmt::Display for OutletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "outlet {} ({}) {}",
            self.id,
            self.name,
            if self.on { "on" } else { "off" }
        )
    }
}

/// Everything a parse pass extracted from one response blob.
///
/// Rows the parser could not make sense of land in `skipped` so the caller can
/// log them; a malformed row never aborts the pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableReport {
    /// Rows parsed successfully, in device order.
    pub records: Vec<OutletRecord>,
    /// Surviving lines that failed to parse, verbatim.
    pub skipped: Vec<String>,
}

impl TableReport {
    /// True when the blob contained no parseable outlet rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of outlet rows parsed.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_display() {
        let record = OutletRecord {
            id: 3,
            name: "Amp".to_string(),
            on: false,
        };
        assert_eq!(record.to_string(), "outlet 3 (Amp) off");
    }

    #[test]
    fn empty_report() {
        let report = TableReport::default();
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
    }
}
