//! Point-sprite instance data

use bytemuck::{Pod, Zeroable};

use crate::sim::fireworks::FireworkShow;
use crate::sim::palette::Rgb;
use crate::sim::sparkles::SparkleField;
use crate::sim::state::SceneState;

/// One point sprite: world position, size and premultiplied color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PointInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

impl PointInstance {
    /// Color is premultiplied by `opacity`, alpha carries `opacity`
    pub fn new(position: [f32; 3], size: f32, color: Rgb, opacity: f32) -> Self {
        let c = color.scale(opacity);
        Self {
            position,
            size,
            color: [c.r, c.g, c.b, opacity],
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Sparkle layer, one instance per pool slot
pub fn sparkle_instances(field: &SparkleField, size: f32) -> Vec<PointInstance> {
    let opacity = field.opacity();
    field
        .particles()
        .iter()
        .map(|p| PointInstance::new(p.position.to_array(), size, p.color, opacity))
        .collect()
}

/// Burst layer; expired sparks are already parked with zero size
pub fn burst_instances(show: &FireworkShow) -> Vec<PointInstance> {
    let opacity = show.burst_opacity();
    show.bursts()
        .iter()
        .map(|b| PointInstance::new(b.position.to_array(), b.size, b.color, opacity))
        .collect()
}

/// Trail layer
pub fn trail_instances(show: &FireworkShow) -> Vec<PointInstance> {
    let opacity = show.trail_opacity();
    show.trails()
        .iter()
        .map(|t| PointInstance::new(t.position.to_array(), t.size, t.color, opacity))
        .collect()
}

/// Sprite size for sparkles (they carry no per-particle size)
pub const SPARKLE_SIZE: f32 = 0.08;

/// All particle layers for one frame. Buffer lengths never change, so the
/// host can allocate its GPU buffers once.
#[derive(Debug, Clone, Default)]
pub struct ParticleBuffers {
    pub sparkles: Vec<PointInstance>,
    pub bursts: Vec<PointInstance>,
    pub trails: Vec<PointInstance>,
}

impl ParticleBuffers {
    pub fn from_scene(state: &SceneState) -> Self {
        Self {
            sparkles: sparkle_instances(&state.sparkles, SPARKLE_SIZE),
            bursts: burst_instances(&state.fireworks),
            trails: trail_instances(&state.fireworks),
        }
    }

    pub fn sparkle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.sparkles)
    }

    pub fn burst_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.bursts)
    }

    pub fn trail_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.trails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<PointInstance>(), 32);
        let desc = PointInstance::desc();
        assert_eq!(desc.array_stride, 32);
        assert_eq!(desc.step_mode, wgpu::VertexStepMode::Instance);
    }

    #[test]
    fn test_premultiplied_color() {
        let inst = PointInstance::new([0.0; 3], 1.0, Rgb::new(1.0, 0.5, 0.0), 0.5);
        assert_eq!(inst.color, [0.5, 0.25, 0.0, 0.5]);
    }

    #[test]
    fn test_buffers_have_fixed_lengths() {
        let state = SceneState::new(3);
        let buffers = ParticleBuffers::from_scene(&state);
        assert_eq!(buffers.sparkles.len(), SPARKLE_COUNT);
        assert_eq!(buffers.bursts.len(), MAX_SHELLS * PARTICLES_PER_SHELL);
        assert_eq!(buffers.trails.len(), MAX_SHELLS * TRAIL_PER_SHELL);
        assert_eq!(buffers.burst_bytes().len(), buffers.bursts.len() * 32);
        // Nothing visible before the first frame
        assert!(buffers.sparkles.iter().all(|s| s.color[3] == 0.0));
        assert!(buffers.bursts.iter().all(|b| b.size == 0.0));
    }
}
