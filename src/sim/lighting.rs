//! Light levels derived from the timeline signals
//!
//! The backdrop fades away while the room lights come up; the host applies
//! these values to its ambient/environment lights and the page overlay.

use serde::{Deserialize, Serialize};

use super::easing::lerp;
use super::timeline::SceneProgress;

const AMBIENT_DARK: f32 = 0.08;
const AMBIENT_LIT: f32 = 0.45;
const KEY_DARK: f32 = 0.2;
const KEY_LIT: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightLevels {
    pub ambient: f32,
    /// Environment-map intensity
    pub environment: f32,
    pub key_light: f32,
    /// CSS opacity of the dark page overlay
    pub overlay_opacity: f32,
}

impl LightLevels {
    pub fn from_progress(progress: SceneProgress) -> Self {
        let lit = progress.environment_progress.clamp(0.0, 1.0);
        Self {
            ambient: lerp(AMBIENT_DARK, AMBIENT_LIT, lit),
            environment: lit,
            key_light: lerp(KEY_DARK, KEY_LIT, lit),
            overlay_opacity: progress.background_opacity.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_at_endpoints() {
        let dark = LightLevels::from_progress(SceneProgress::IDLE);
        assert_eq!(dark.ambient, AMBIENT_DARK);
        assert_eq!(dark.environment, 0.0);
        assert_eq!(dark.overlay_opacity, 1.0);

        let lit = LightLevels::from_progress(SceneProgress::DONE);
        assert_eq!(lit.ambient, AMBIENT_LIT);
        assert_eq!(lit.key_light, KEY_LIT);
        assert_eq!(lit.overlay_opacity, 0.0);
    }
}
