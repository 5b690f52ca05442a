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

//! Outlet-table parser.
//!
//! The device answers `pshow` with a decorated table:
//!
//! ```text
//! pshow
//! ********************************
//! *  Pakedge Power Distribution  *
//! ********************************
//!  Port | Name        | Status |
//!  -----|-------------|--------|
//!    1  | Lamp        | ON     |
//!    2  | Fan         | OFF    |
//!
//! >
//! ```
//!
//! Parsing is two phases: strip the chrome, then split the surviving rows on
//! `|`. Both phases are pure functions over the input text.

use crate::consts;
use crate::record::{OutletRecord, TableReport};
use crate::result::{ProtocolError, ProtocolResult};
use tracing::debug;

/// Remove decorative and header lines from a raw response blob.
///
/// A line survives only if, after trimming, it is non-empty, is not a bare
/// prompt, and contains none of the known chrome markers.
pub fn strip_chrome(input: &str) -> Vec<&str> {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty()
                && trimmed != consts::BARE_PROMPT
                && !consts::CHROME_MARKERS
                    .iter()
                    .any(|marker| line.contains(marker))
        })
        .collect()
}

/// Parse one surviving table row.
///
/// Field 0 is the outlet id, field 1 the name verbatim (trimmed), field 2 the
/// power state compared case-sensitively against `ON`.
pub fn parse_row(line: &str) -> ProtocolResult<OutletRecord> {
    let fields: Vec<&str> = line.split(consts::FIELD_DELIMITER).collect();
    if fields.len() < 3 {
        return Err(ProtocolError::MalformedRow {
            line: line.to_string(),
            reason: format!("expected at least 3 fields, found {}", fields.len()),
        });
    }
    let id = fields[0]
        .trim()
        .parse::<u32>()
        .map_err(|e| ProtocolError::MalformedRow {
            line: line.to_string(),
            reason: format!("invalid outlet id: {}", e),
        })?;
    Ok(OutletRecord {
        id,
        name: fields[1].trim().to_string(),
        on: fields[2].trim() == consts::STATE_ON,
    })
}

/// Parse a full response blob into outlet records.
///
/// Rows that survive chrome stripping but fail to parse are collected as
/// skipped, not errors: a garbled row must never abort a poll cycle.
pub fn parse_outlet_table(input: &str) -> TableReport {
    let mut report = TableReport::default();
    for line in strip_chrome(input) {
        match parse_row(line) {
            Ok(record) => report.records.push(record),
            Err(error) => {
                debug!(%error, "skipping unparseable table row");
                report.skipped.push(line.to_string());
            }
        }
    }
    report
}

/// Scan a response blob for the row describing one outlet.
///
/// Used after `pset`/`prb` to verify the new state: the device has no
/// single-outlet query, so the full table is fetched and scanned.
pub fn find_outlet(input: &str, id: u32) -> Option<OutletRecord> {
    parse_outlet_table(input)
        .records
        .into_iter()
        .find(|record| record.id == id)
}
