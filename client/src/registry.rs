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

//! In-memory table of outlet entities.
//!
//! Outlets are created lazily the first time they appear in a device report
//! and are never removed while the session lives; the registry survives
//! reconnects so callers keep a last-known view across network drops.

use crate::events::PowerChange;
use pdulink_protocol::{OutletRecord, TableReport};
use std::collections::BTreeMap;

/// One switchable power port on the PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outlet {
    /// Outlet id, stable for the device lifetime.
    pub id: u32,
    /// Display name, fixed at first discovery and not re-validated.
    pub name: String,
    /// Last known power state, authoritative only until the next poll.
    pub on: bool,
}

/// Outlet table keyed by id.
#[derive(Debug, Default)]
pub struct OutletRegistry {
    outlets: BTreeMap<u32, Outlet>,
}

impl OutletRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of known outlets.
    pub fn len(&self) -> usize {
        self.outlets.len()
    }

    /// True when no outlet has been discovered yet.
    pub fn is_empty(&self) -> bool {
        self.outlets.is_empty()
    }

    /// Look up one outlet.
    pub fn get(&self, id: u32) -> Option<&Outlet> {
        self.outlets.get(&id)
    }

    /// Reconcile the registry with a full device report.
    ///
    /// Unknown outlets are created (name fixed at first sight); known outlets
    /// have their power state updated. Returns the state transitions only;
    /// first discovery is not a transition.
    pub fn reconcile(&mut self, report: &TableReport) -> Vec<PowerChange> {
        let mut changes = Vec::new();
        for record in &report.records {
            if let Some(change) = self.apply(record) {
                changes.push(change);
            }
        }
        changes
    }

    /// Apply a single record, returning the transition if the state flipped.
    pub fn apply(&mut self, record: &OutletRecord) -> Option<PowerChange> {
        match self.outlets.get_mut(&record.id) {
            Some(outlet) => {
                if outlet.on == record.on {
                    return None;
                }
                outlet.on = record.on;
                Some(PowerChange {
                    outlet: outlet.id,
                    name: outlet.name.clone(),
                    on: outlet.on,
                })
            }
            None => {
                self.outlets.insert(
                    record.id,
                    Outlet {
                        id: record.id,
                        name: record.name.clone(),
                        on: record.on,
                    },
                );
                None
            }
        }
    }

    /// Snapshot of all outlets in id order, possibly stale relative to the
    /// device.
    pub fn snapshot(&self) -> Vec<Outlet> {
        self.outlets.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdulink_protocol::parse_outlet_table;

    #[test]
    fn discovery_creates_outlets_without_transitions() {
        let mut registry = OutletRegistry::new();
        let report = parse_outlet_table("1 | Lamp | ON |\n2 | Fan | OFF |");
        let changes = registry.reconcile(&report);
        assert!(changes.is_empty());
        assert_eq!(registry.len(), 2);
        assert!(registry.get(1).unwrap().on);
        assert!(!registry.get(2).unwrap().on);
    }

    #[test]
    fn reconcile_converges_without_duplicates() {
        let mut registry = OutletRegistry::new();
        let report = parse_outlet_table("1 | Lamp | ON |\n2 | Fan | OFF |");
        registry.reconcile(&report);
        let changes = registry.reconcile(&report);
        assert!(changes.is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn state_flip_reports_one_change() {
        let mut registry = OutletRegistry::new();
        registry.reconcile(&parse_outlet_table("1 | Lamp | ON |"));
        let changes = registry.reconcile(&parse_outlet_table("1 | Lamp | OFF |"));
        assert_eq!(
            changes,
            vec![PowerChange {
                outlet: 1,
                name: "Lamp".to_string(),
                on: false,
            }]
        );
    }

    #[test]
    fn name_is_fixed_at_first_discovery() {
        let mut registry = OutletRegistry::new();
        registry.reconcile(&parse_outlet_table("1 | Lamp | ON |"));
        registry.reconcile(&parse_outlet_table("1 | Renamed | ON |"));
        assert_eq!(registry.get(1).unwrap().name, "Lamp");
    }

    #[test]
    fn snapshot_is_id_ordered() {
        let mut registry = OutletRegistry::new();
        registry.reconcile(&parse_outlet_table("3 | C | ON |\n1 | A | OFF |\n2 | B | ON |"));
        let ids: Vec<u32> = registry.snapshot().iter().map(|o| o.id).collect();
        assert_eq!(ids, [1, 2, 3]);
    }
}
