//! Colors and palettes for sparkles and fireworks

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Linear RGB color, components nominally in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a 0xRRGGBB literal
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    pub fn scale(self, k: f32) -> Rgb {
        Rgb {
            r: self.r * k,
            g: self.g * k,
            b: self.b * k,
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Sparkle colors: warm gold, soft pink, pure white
pub const SPARKLE_GOLD: Rgb = Rgb::from_hex(0xffd27a);
pub const SPARKLE_PINK: Rgb = Rgb::from_hex(0xffb6d5);
pub const SPARKLE_WHITE: Rgb = Rgb::WHITE;

/// Pick a sparkle color (40% gold, 30% pink, 30% white)
pub fn sparkle_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    let roll: f32 = rng.random();
    if roll < 0.4 {
        SPARKLE_GOLD
    } else if roll < 0.7 {
        SPARKLE_PINK
    } else {
        SPARKLE_WHITE
    }
}

/// Warm orange tint of rising shell trails
pub const TRAIL_TINT: Rgb = Rgb::from_hex(0xffa040);

/// A firework color set: burst colors blend from first to last as sparks age
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSet {
    pub name: &'static str,
    pub colors: [Rgb; 3],
}

impl ColorSet {
    /// Color at normalized age `t` (0 = fresh spark, 1 = end of life)
    pub fn sample(&self, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let last = self.colors.len() - 1;
        let scaled = t * last as f32;
        let i = (scaled.floor() as usize).min(last - 1);
        let frac = scaled - i as f32;
        self.colors[i].lerp(self.colors[i + 1], frac)
    }
}

/// The seven firework palettes
pub const FIREWORK_PALETTES: [ColorSet; 7] = [
    ColorSet {
        name: "gold",
        colors: [Rgb::from_hex(0xfff4c2), Rgb::from_hex(0xffd700), Rgb::from_hex(0xff8c00)],
    },
    ColorSet {
        name: "crimson",
        colors: [Rgb::from_hex(0xffd0d0), Rgb::from_hex(0xff3040), Rgb::from_hex(0x900020)],
    },
    ColorSet {
        name: "azure",
        colors: [Rgb::from_hex(0xe0f4ff), Rgb::from_hex(0x40a0ff), Rgb::from_hex(0x1030c0)],
    },
    ColorSet {
        name: "emerald",
        colors: [Rgb::from_hex(0xe0ffe8), Rgb::from_hex(0x30e070), Rgb::from_hex(0x087030)],
    },
    ColorSet {
        name: "violet",
        colors: [Rgb::from_hex(0xf0e0ff), Rgb::from_hex(0xb050ff), Rgb::from_hex(0x5010a0)],
    },
    ColorSet {
        name: "rose",
        colors: [Rgb::from_hex(0xfff0f6), Rgb::from_hex(0xff70b0), Rgb::from_hex(0xc02070)],
    },
    ColorSet {
        name: "silver",
        colors: [Rgb::WHITE, Rgb::from_hex(0xd0d8e8), Rgb::from_hex(0x8090a8)],
    },
];

/// Random firework palette
pub fn random_palette<R: Rng + ?Sized>(rng: &mut R) -> &'static ColorSet {
    &FIREWORK_PALETTES[rng.random_range(0..FIREWORK_PALETTES.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        let c = Rgb::from_hex(0xff0080);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_color_set_sample_endpoints() {
        let set = &FIREWORK_PALETTES[0];
        assert_eq!(set.sample(0.0), set.colors[0]);
        assert_eq!(set.sample(1.0), set.colors[2]);
        assert_eq!(set.sample(0.5), set.colors[1]);
        // Out-of-range ages clamp
        assert_eq!(set.sample(4.0), set.colors[2]);
    }

    #[test]
    fn test_sparkle_weights() {
        use rand::SeedableRng;
        let mut rng = rand_pcg::Pcg32::seed_from_u64(42);
        let mut gold = 0;
        let n = 10_000;
        for _ in 0..n {
            if sparkle_color(&mut rng) == SPARKLE_GOLD {
                gold += 1;
            }
        }
        let share = gold as f32 / n as f32;
        assert!((share - 0.4).abs() < 0.03, "gold share {share}");
    }
}
