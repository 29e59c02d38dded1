//! Lighting model shared by the fragment shader and a CPU reference used to
//! pin down its behaviour.

use cgmath::{ElementWise, InnerSpace, Vector3};

pub const AMBIENT: f32 = 0.2;
pub const DIFFUSE: f32 = 0.7;
pub const SPECULAR: f32 = 0.3;
pub const SHININESS: f32 = 32.0;

/// Color shown for a selector the shader does not know.
pub const INVALID_SELECTOR_COLOR: [f32; 4] = [1.0, 0.2, 0.2, 1.0];

/// Base-color source, sent to the shader as an integer uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSelector {
    Solid,
    UvDebug,
    Sampler(u8),
}

impl TextureSelector {
    pub fn as_uniform(self) -> i32 {
        match self {
            TextureSelector::Solid => -2,
            TextureSelector::UvDebug => -1,
            TextureSelector::Sampler(i) => i as i32,
        }
    }

    pub fn from_uniform(value: i32) -> Option<Self> {
        match value {
            -2 => Some(TextureSelector::Solid),
            -1 => Some(TextureSelector::UvDebug),
            0..=2 => Some(TextureSelector::Sampler(value as u8)),
            _ => None,
        }
    }
}

/// Frame-wide lighting inputs, uploaded once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingUniforms {
    pub camera_pos: [f32; 3],
    pub light_pos: [f32; 3],
    pub light_color: [f32; 3],
    pub light_on: bool,
    pub normal_visualization: bool,
    pub spotlight_on: bool,
    pub spotlight_dir: [f32; 3],
    /// Cone half-angle in radians.
    pub spotlight_cutoff: f32,
}

/// Interpolated per-fragment inputs in world space.
#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    pub world_pos: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub uv: [f32; 2],
}

/// Spotlight attenuation: 0 outside the cone, squared ramp inside.
pub fn spotlight_factor(
    light_pos: Vector3<f32>,
    direction: Vector3<f32>,
    cutoff: f32,
    world_pos: Vector3<f32>,
) -> f32 {
    let light_to_frag = (world_pos - light_pos).normalize();
    let spot_cos = light_to_frag.dot(direction.normalize());
    let cutoff_cos = cutoff.cos();
    if spot_cos < cutoff_cos {
        0.0
    } else {
        ((spot_cos - cutoff_cos) / (1.0 - cutoff_cos)).powi(2)
    }
}

/// CPU rendition of the fragment stage.
///
/// `selector` is the raw texture-selector uniform, `texels` the colors the
/// three samplers return at `frag.uv`.
pub fn shade(
    frag: &Fragment,
    selector: i32,
    solid: [f32; 4],
    texels: &[[f32; 4]; 3],
    uniforms: &LightingUniforms,
) -> [f32; 4] {
    let n = frag.normal.normalize();
    if uniforms.normal_visualization {
        return [(n.x + 1.0) / 2.0, (n.y + 1.0) / 2.0, (n.z + 1.0) / 2.0, 1.0];
    }

    let base = match TextureSelector::from_uniform(selector) {
        Some(TextureSelector::Solid) => solid,
        Some(TextureSelector::UvDebug) => [frag.uv[0], frag.uv[1], 1.0, 1.0],
        Some(TextureSelector::Sampler(i)) => texels[i as usize],
        None => INVALID_SELECTOR_COLOR,
    };

    if !uniforms.light_on {
        return base;
    }

    let light_pos = Vector3::from(uniforms.light_pos);
    let light_color = Vector3::from(uniforms.light_color);
    let l = (light_pos - frag.world_pos).normalize();
    let n_dot_l = n.dot(l).max(0.0);

    let e = (Vector3::from(uniforms.camera_pos) - frag.world_pos).normalize();
    let r = reflect(-l, n);
    let specular = e.dot(r).max(0.0).powf(SHININESS);

    let spot = if uniforms.spotlight_on {
        spotlight_factor(
            light_pos,
            Vector3::from(uniforms.spotlight_dir),
            uniforms.spotlight_cutoff,
            frag.world_pos,
        )
    } else {
        1.0
    };

    let color = Vector3::new(base[0], base[1], base[2]);
    let ambient = color * AMBIENT;
    let diffuse = color.mul_element_wise(light_color) * (n_dot_l * DIFFUSE);
    let spec = light_color * (specular * SPECULAR);
    let lit = ambient + (diffuse + spec) * spot;
    [lit.x, lit.y, lit.z, base[3]]
}

fn reflect(i: Vector3<f32>, n: Vector3<f32>) -> Vector3<f32> {
    i - n * (2.0 * n.dot(i))
}
