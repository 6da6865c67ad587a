use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::component::{ComponentDraft, Material};
use crate::document::CubesatDimensions;
use crate::error::ConfigResult;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::interaction::InteractionSettings;

/// Display metadata for one section of the chassis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDef {
    pub key: String,
    pub label: String,
    pub color: u32,
    /// Z extent `[min, max]` along the chassis
    pub range: [f32; 2],
}

impl SectionDef {
    fn new(key: &str, label: &str, color: u32, range: [f32; 2]) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            color,
            range,
        }
    }
}

/// Everything the editor needs to start up.
///
/// `Settings::default()` is the stock 3U layout; a JSON file with the same
/// shape can override any part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub cubesat: CubesatDimensions,
    pub sections: Vec<SectionDef>,
    pub material_defaults: Material,
    pub interaction: InteractionSettings,
    /// Layout loaded on start and by "reset to default"
    pub components: Vec<ComponentDraft>,
    pub history_capacity: usize,
    /// Directory for saved and auto-saved configurations
    pub store_dir: String,
    pub autosave_interval_secs: u64,
    pub max_autosaves: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cubesat: CubesatDimensions::default(),
            sections: vec![
                SectionDef::new("U1", "U1 - Experiment", 0xe06161, [5.665, 17.0]),
                SectionDef::new("U2", "U2 - Sensors & Optics", 0x61b3e0, [-5.665, 5.665]),
                SectionDef::new("U3", "U3 - Electronics & DAQ", 0x9be26b, [-17.0, -5.665]),
            ],
            material_defaults: Material::default(),
            interaction: InteractionSettings::default(),
            components: default_components(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            store_dir: "cubesat_configs".to_owned(),
            autosave_interval_secs: 60,
            max_autosaves: 5,
        }
    }
}

impl Settings {
    /// Reads settings from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn section_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections.iter().map(|section| section.key.as_str())
    }

    pub fn section(&self, key: &str) -> Option<&SectionDef> {
        self.sections.iter().find(|section| section.key == key)
    }
}

/// The stock payload of the 3U demonstrator
fn default_components() -> Vec<ComponentDraft> {
    vec![
        ComponentDraft::new("Furnace / Crucible", "U1", [9.0, 6.0, 10.5], [0.0, 0.0, 11.33], 0xe06161)
            .with_id("furnace")
            .with_category("experiment")
            .with_description("Primary payload - high-temperature furnace for material experiments")
            .with_spec("maxTemp", "1200°C")
            .with_spec("power", "50W")
            .with_spec("mass", "450g"),
        ComponentDraft::new("Thermocouple Array", "U1", [2.2, 0.6, 2.2], [0.0, 3.0, 13.9], 0xffc66b)
            .with_id("thermocouple")
            .with_category("sensor")
            .with_description("Temperature monitoring array mounted on furnace")
            .with_spec("channels", "8")
            .with_spec("range", "-50°C to 1300°C")
            .with_spec("accuracy", "±0.5°C"),
        ComponentDraft::new("Mini CMOS Camera", "U2", [4.0, 3.5, 3.0], [-2.4, 0.0, 4.0], 0x61b3e0)
            .with_id("camera")
            .with_category("optics")
            .with_description("Front-facing high-resolution camera")
            .with_spec("resolution", "1920x1080")
            .with_spec("fps", "30")
            .with_spec("fov", "60°"),
        ComponentDraft::new("Fiber Spectrometer", "U2", [5.2, 2.8, 2.6], [2.6, 0.0, 1.2], 0x61b3e0)
            .with_id("spectrometer")
            .with_category("optics")
            .with_description("Optical spectrometer for material analysis")
            .with_spec("range", "200-1100nm")
            .with_spec("resolution", "0.5nm")
            .with_spec("integration", "1ms-10s"),
        ComponentDraft::new("Acoustic Sensor", "U2", [2.6, 1.8, 1.6], [-3.0, 0.0, -3.8], 0x61b3e0)
            .with_id("acoustic")
            .with_category("sensor")
            .with_description("Acoustic monitoring sensor")
            .with_spec("frequency", "20Hz-20kHz")
            .with_spec("sensitivity", "-40dB")
            .with_spec("power", "0.5W"),
        ComponentDraft::new("DAQ / MCU & Storage", "U3", [8.6, 3.6, 8.6], [0.0, 0.0, -10.3], 0x9be26b)
            .with_id("daq")
            .with_category("electronics")
            .with_description("Central data acquisition and processing unit")
            .with_spec("processor", "ARM Cortex-M7")
            .with_spec("storage", "128GB")
            .with_spec("ram", "512MB"),
        ComponentDraft::new("Power Conditioning / Heaters", "U3", [4.0, 2.4, 4.0], [2.6, 0.0, -14.0], 0x7fb86f)
            .with_id("power")
            .with_category("power")
            .with_description("Power management and thermal control")
            .with_spec("voltage", "3.3V-12V")
            .with_spec("current", "5A max")
            .with_spec("heater", "10W"),
        ComponentDraft::new("Pressure & Gas MEMS", "U3", [2.2, 1.6, 2.2], [-3.0, 0.0, -12.6], 0x7fb86f)
            .with_id("mems")
            .with_category("sensor")
            .with_description("MEMS-based pressure and gas sensors")
            .with_spec("range", "0-100kPa")
            .with_spec("accuracy", "±0.1%")
            .with_spec("gases", "O2, N2, CO2"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_keep_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "historyCapacity": 10 }"#).unwrap();
        assert_eq!(settings.history_capacity, 10);
        assert_eq!(settings.components.len(), 8);
        assert_eq!(settings.section_keys().collect::<Vec<_>>(), ["U1", "U2", "U3"]);
    }

    #[test]
    fn default_components_sit_in_known_sections() {
        let settings = Settings::default();
        for component in &settings.components {
            assert!(settings.section(&component.section).is_some(), "{}", component.section);
        }
    }
}
