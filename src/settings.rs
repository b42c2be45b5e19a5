//! Card settings and preferences
//!
//! Persisted separately from the scene config in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::config::SceneConfig;
use crate::sim::state::SceneInput;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Ambient sparkle pool size
    pub fn sparkle_count(&self) -> usize {
        match self {
            QualityPreset::Low => 150,
            QualityPreset::Medium => 400,
            QualityPreset::High => 600,
        }
    }

    /// Burst particles per firework shell
    pub fn particles_per_shell(&self) -> usize {
        match self {
            QualityPreset::Low => 40,
            QualityPreset::Medium => 80,
            QualityPreset::High => 120,
        }
    }

    /// Shell pool size
    pub fn max_shells(&self) -> usize {
        match self {
            QualityPreset::Low => 6,
            QualityPreset::Medium | QualityPreset::High => 12,
        }
    }
}

/// Card settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Particle quality preset
    pub quality: QualityPreset,
    /// Allow the falling sparkles
    pub sparkles: bool,
    /// Allow the firework show
    pub fireworks: bool,
    /// Reduced motion (no sparkle sway, no firework flicker)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            sparkles: true,
            fireworks: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Scene config with the preset pool sizes and accessibility overrides
    /// applied on top of the defaults
    pub fn scene_config(&self) -> SceneConfig {
        let mut config = SceneConfig::default();
        config.sparkles.count = self.quality.sparkle_count();
        config.fireworks.particles_per_shell = self.quality.particles_per_shell();
        config.fireworks.max_shells = self.quality.max_shells();
        config.fireworks.initial_volley =
            config.fireworks.initial_volley.min(config.fireworks.max_shells);

        if self.reduced_motion {
            config.sparkles.sway_amplitude = 0.0;
            config.fireworks.flicker_min = 1.0;
        }
        config
    }

    /// Mask the host's requested layers with the user's preferences
    pub fn filter_input(&self, input: &mut SceneInput) {
        input.sparkles_active &= self.sparkles;
        input.fireworks_active &= self.fireworks;
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "greeting_card_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
        {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(err) => log::warn!("Ignoring stored settings: {}", err),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(json) = serde_json::to_string(self)
        {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
