use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::component::Component;
use crate::registry::ComponentRegistry;
use crate::util::time;

/// Format version written into every exported document
pub const CONFIG_VERSION: &str = "1.0.0";

/// Outer dimensions of the chassis, in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CubesatDimensions {
    pub width: f32,
    pub height: f32,
    pub length: f32,
    /// Number of U sections
    pub units: u32,
    pub unit_length: f32,
}

impl Default for CubesatDimensions {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 10.0,
            length: 34.0,
            units: 3,
            unit_length: 11.33,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub total_components: usize,
    /// Component count per section
    pub sections: BTreeMap<String, usize>,
}

/// The JSON document used for export, import and saved configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    pub version: String,
    /// ISO-8601, UTC
    pub timestamp: String,
    pub cubesat: CubesatDimensions,
    pub components: Vec<Component>,
    pub sections: BTreeMap<String, bool>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl ConfigDocument {
    /// Captures the registry as it is right now.
    pub fn from_registry(registry: &ComponentRegistry, cubesat: &CubesatDimensions) -> Self {
        let metadata = DocumentMetadata {
            total_components: registry.len(),
            sections: registry
                .section_names()
                .map(|name| (name.to_owned(), registry.section_count(name)))
                .collect(),
        };

        Self {
            version: CONFIG_VERSION.to_owned(),
            timestamp: time::iso_timestamp(),
            cubesat: *cubesat,
            components: registry.export_snapshot_data(),
            sections: registry.section_visibility(),
            metadata,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
