use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::component::Component;
use crate::registry::ComponentRegistry;
use crate::util::time;

/// A full copy of the registry at one point in time.
///
/// Snapshots hold their own records, so later registry edits never reach them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Milliseconds since the UNIX epoch
    timestamp: u64,
    components: Vec<Component>,
    sections: BTreeMap<String, bool>,
}

impl Snapshot {
    pub fn capture(registry: &ComponentRegistry) -> Self {
        Self {
            timestamp: time::timestamp_millis(),
            components: registry.export_snapshot_data(),
            sections: registry.section_visibility(),
        }
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn sections(&self) -> &BTreeMap<String, bool> {
        &self.sections
    }
}
