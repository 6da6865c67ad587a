//! Pointer interaction state: which component is hovered, which is selected,
//! and the flash that plays when something gets selected.
//!
//! Highlights are sent through [`ComponentRegistry::highlight`] so they reach
//! the visual proxies the same way data changes do. Nothing here runs on its
//! own; the frame loop calls [`InteractionState::tick`] with the current time.

use serde::{Deserialize, Serialize};

use crate::registry::ComponentRegistry;

/// How strongly hovered and selected components glow, and how the selection
/// flash is timed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionSettings {
    pub hover_emissive_intensity: f32,
    pub select_emissive_intensity: f32,
    /// Time between two flash toggles, in milliseconds
    pub flash_duration_ms: u64,
    /// Number of bright/normal cycles
    pub flash_count: u32,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            hover_emissive_intensity: 0.3,
            select_emissive_intensity: 0.5,
            flash_duration_ms: 150,
            flash_count: 6,
        }
    }
}

/// Peak intensity of the flash relative to the steady selection glow
const FLASH_BOOST: f32 = 1.6;

#[derive(Debug, Clone, Copy, PartialEq)]
struct FlashTimer {
    /// Seconds
    started_at: f64,
    /// Seconds per toggle
    period: f64,
    toggles: u32,
}

impl FlashTimer {
    /// Toggles elapsed at `now`, or `None` once the flash is over
    fn toggles_at(&self, now: f64) -> Option<u32> {
        let elapsed = (now - self.started_at).max(0.0);
        let toggles = (elapsed / self.period).floor() as u32;
        (toggles < self.toggles).then_some(toggles)
    }
}

type Listener = Box<dyn FnMut(Option<&str>)>;

pub struct InteractionState {
    settings: InteractionSettings,
    hovered: Option<String>,
    selected: Option<String>,
    flash: Option<FlashTimer>,
    /// Intensity last sent for the selected component
    selected_intensity: f32,
    select_listeners: Vec<Listener>,
    hover_listeners: Vec<Listener>,
}

impl std::fmt::Debug for InteractionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionState")
            .field("hovered", &self.hovered)
            .field("selected", &self.selected)
            .field("flash", &self.flash)
            .field("listeners", &(self.select_listeners.len() + self.hover_listeners.len()))
            .finish()
    }
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new(InteractionSettings::default())
    }
}

impl InteractionState {
    pub fn new(settings: InteractionSettings) -> Self {
        Self {
            settings,
            hovered: None,
            selected: None,
            flash: None,
            selected_intensity: 0.0,
            select_listeners: Vec::new(),
            hover_listeners: Vec::new(),
        }
    }

    pub fn settings(&self) -> &InteractionSettings {
        &self.settings
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.is_some()
    }

    /// Called with the newly selected id, or `None` when the selection clears
    pub fn on_select(&mut self, listener: impl FnMut(Option<&str>) + 'static) {
        self.select_listeners.push(Box::new(listener));
    }

    /// Called whenever the hovered component changes
    pub fn on_hover(&mut self, listener: impl FnMut(Option<&str>) + 'static) {
        self.hover_listeners.push(Box::new(listener));
    }

    /// Glow the component currently under the pointer.
    pub fn hover(&mut self, registry: &ComponentRegistry, id: Option<String>) {
        if self.hovered == id {
            return;
        }

        if let Some(previous) = self.hovered.take() {
            if Some(&previous) != self.selected.as_ref() {
                send(registry, &previous, 0.0);
            }
        }
        if let Some(current) = &id {
            if Some(current) != self.selected.as_ref() {
                send(registry, current, self.settings.hover_emissive_intensity);
            }
        }

        self.hovered = id;
        let hovered = self.hovered.as_deref();
        for listener in &mut self.hover_listeners {
            listener(hovered);
        }
    }

    /// Select a component (or nothing) and start its flash.
    ///
    /// Any running flash is cancelled first. Unknown ids are ignored and
    /// return false.
    pub fn select(&mut self, registry: &ComponentRegistry, id: Option<String>, now: f64) -> bool {
        if let Some(candidate) = &id {
            if !registry.contains(candidate) {
                log::warn!("Cannot select unknown component {}", candidate);
                return false;
            }
        }

        self.flash = None;
        if let Some(previous) = self.selected.take() {
            send(registry, &previous, 0.0);
        }

        if let Some(current) = &id {
            self.selected_intensity = self.settings.select_emissive_intensity;
            send(registry, current, self.selected_intensity);
            self.flash = Some(FlashTimer {
                started_at: now,
                period: self.settings.flash_duration_ms.max(1) as f64 / 1000.0,
                toggles: self.settings.flash_count.saturating_mul(2),
            });
        }

        self.selected = id;
        let selected = self.selected.as_deref();
        for listener in &mut self.select_listeners {
            listener(selected);
        }
        true
    }

    /// Drop the selection and cancel its flash.
    pub fn clear_selection(&mut self, registry: &ComponentRegistry) {
        if self.selected.is_some() {
            self.select(registry, None, 0.0);
        }
    }

    /// Advance the selection flash to `now` (seconds).
    pub fn tick(&mut self, registry: &ComponentRegistry, now: f64) {
        let (Some(flash), Some(selected)) = (self.flash, self.selected.as_deref()) else {
            return;
        };

        let base = self.settings.select_emissive_intensity;
        let intensity = match flash.toggles_at(now) {
            Some(toggles) if toggles % 2 == 1 => base * FLASH_BOOST,
            Some(_) => base,
            None => {
                self.flash = None;
                base
            }
        };

        if intensity != self.selected_intensity {
            self.selected_intensity = intensity;
            send(registry, selected, intensity);
        }
    }

    /// Intensity a component should currently glow with.
    pub fn highlight_of(&self, id: &str) -> f32 {
        if self.selected.as_deref() == Some(id) {
            self.selected_intensity
        } else if self.hovered.as_deref() == Some(id) {
            self.settings.hover_emissive_intensity
        } else {
            0.0
        }
    }

    /// Forget hovered/selected ids that are gone from the registry, e.g.
    /// after a remove or an undo.
    pub fn prune(&mut self, registry: &ComponentRegistry) {
        if self.hovered.as_deref().is_some_and(|id| !registry.contains(id)) {
            self.hovered = None;
        }
        if self.selected.as_deref().is_some_and(|id| !registry.contains(id)) {
            self.selected = None;
            self.flash = None;
            for listener in &mut self.select_listeners {
                listener(None);
            }
        }
    }

    /// Prunes, then sends the current glow of the surviving hovered and
    /// selected components again. Call after the proxies were rebuilt from
    /// scratch (undo, redo, import).
    pub fn refresh(&mut self, registry: &ComponentRegistry) {
        self.prune(registry);
        if let Some(hovered) = self.hovered.as_deref() {
            if self.selected.as_deref() != Some(hovered) {
                send(registry, hovered, self.settings.hover_emissive_intensity);
            }
        }
        if let Some(selected) = self.selected.as_deref() {
            send(registry, selected, self.selected_intensity);
        }
    }
}

fn send(registry: &ComponentRegistry, id: &str, intensity: f32) {
    // The component may already be gone (removed between frames)
    if let Err(err) = registry.highlight(id, intensity) {
        log::debug!("Highlight skipped: {}", err);
    }
}
