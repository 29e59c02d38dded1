//! Mutable scene state: light, spotlight, display toggles and the animal
//! pose. Owned by the frame orchestrator and changed only through the
//! setters below, which is what the input layer calls.

use cgmath::{Deg, Matrix4, Vector3};

use crate::lighting::LightingUniforms;

/// Slider units per world unit for the light position sliders.
pub const LIGHT_SLIDER_SCALE: f32 = 50.0;
/// Slider units per color unit for the light color sliders.
pub const COLOR_SLIDER_SCALE: f32 = 100.0;

/// Narrowest spotlight cone half-angle, degrees.
pub const MIN_SPOTLIGHT_CUTOFF: f32 = 0.5;

const LIGHT_ORBIT_RADIUS: f32 = 2.0;
const LIGHT_ORBIT_SPEED: f32 = 0.5;
const ANIMAL_YAW_RATE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    R,
    G,
    B,
}

impl Channel {
    fn index(self) -> usize {
        match self {
            Channel::R => 0,
            Channel::G => 1,
            Channel::B => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimalPose {
    pub position: [f32; 3],
    pub yaw_degrees: f32,
}

impl AnimalPose {
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(Vector3::from(self.position))
            * Matrix4::from_angle_y(Deg(self.yaw_degrees))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    pub light_pos: [f32; 3],
    pub light_color: [f32; 3],
    pub light_on: bool,
    pub spotlight_on: bool,
    pub spotlight_dir: [f32; 3],
    spotlight_cutoff_degrees: f32,
    pub normal_visualization: bool,
    pub animate: bool,
    pub animal: AnimalPose,
    /// Seconds since the loop started, as of the last `advance`.
    pub seconds: f64,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            light_pos: [2.0, 3.0, 2.0],
            light_color: [1.0, 1.0, 1.0],
            light_on: true,
            spotlight_on: false,
            spotlight_dir: [0.0, -1.0, 0.0],
            spotlight_cutoff_degrees: 30.0,
            normal_visualization: false,
            animate: false,
            animal: AnimalPose::default(),
            seconds: 0.0,
        }
    }
}

impl SceneState {
    /// Puts the animal back at the origin. Light settings are left alone.
    pub fn reset(&mut self) {
        self.animal = AnimalPose::default();
    }

    pub fn set_light_axis_from_slider(&mut self, axis: Axis, raw: f32) {
        self.light_pos[axis.index()] = raw / LIGHT_SLIDER_SCALE;
    }

    pub fn set_light_color_from_slider(&mut self, channel: Channel, raw: f32) {
        self.light_color[channel.index()] = raw / COLOR_SLIDER_SCALE;
    }

    pub fn set_light_on(&mut self, on: bool) {
        self.light_on = on;
    }

    pub fn toggle_light(&mut self) {
        self.light_on = !self.light_on;
    }

    pub fn set_spotlight_on(&mut self, on: bool) {
        self.spotlight_on = on;
    }

    /// Cutoffs below `MIN_SPOTLIGHT_CUTOFF` degrees are raised to it; a zero
    /// cone divides by zero on the spotlight axis.
    pub fn set_spotlight_cutoff_degrees(&mut self, degrees: f32) {
        self.spotlight_cutoff_degrees = degrees.max(MIN_SPOTLIGHT_CUTOFF);
    }

    /// Cone half-angle as uploaded to the shader.
    pub fn spotlight_cutoff_radians(&self) -> f32 {
        self.spotlight_cutoff_degrees * std::f32::consts::PI / 180.0
    }

    pub fn set_normal_visualization(&mut self, on: bool) {
        self.normal_visualization = on;
    }

    pub fn toggle_normal_visualization(&mut self) {
        self.normal_visualization = !self.normal_visualization;
    }

    pub fn set_animate(&mut self, on: bool) {
        self.animate = on;
    }

    /// Moves the clock to `seconds` and, when animating, orbits the light and
    /// sways the animal.
    pub fn advance(&mut self, seconds: f64) {
        self.seconds = seconds;
        if !self.animate {
            return;
        }
        let s = seconds as f32;
        self.light_pos[0] = LIGHT_ORBIT_RADIUS * (s * LIGHT_ORBIT_SPEED).cos();
        self.light_pos[2] = LIGHT_ORBIT_RADIUS * (s * LIGHT_ORBIT_SPEED).sin();

        self.animal.position[0] = 0.2 * (s * 0.3).sin();
        self.animal.position[2] = 0.2 * (s * 0.2).cos();
        self.animal.yaw_degrees = s * ANIMAL_YAW_RATE;
    }

    pub fn lighting_uniforms(&self, camera_pos: [f32; 3]) -> LightingUniforms {
        LightingUniforms {
            camera_pos,
            light_pos: self.light_pos,
            light_color: self.light_color,
            light_on: self.light_on,
            normal_visualization: self.normal_visualization,
            spotlight_on: self.spotlight_on,
            spotlight_dir: self.spotlight_dir,
            spotlight_cutoff: self.spotlight_cutoff_radians(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::spotlight_factor;
    use approx::assert_relative_eq;

    #[test]
    fn light_slider_scales_by_fifty() {
        let mut scene = SceneState::default();
        scene.set_light_axis_from_slider(Axis::X, 150.0);
        assert_eq!(scene.light_pos[0], 3.0);
        scene.set_light_axis_from_slider(Axis::Z, -100.0);
        assert_eq!(scene.light_pos[2], -2.0);
        assert_eq!(scene.light_pos[1], 3.0);
    }

    #[test]
    fn color_slider_scales_by_hundred() {
        let mut scene = SceneState::default();
        scene.set_light_color_from_slider(Channel::G, 25.0);
        assert_eq!(scene.light_color, [1.0, 0.25, 1.0]);
    }

    #[test]
    fn cutoff_is_uploaded_in_radians() {
        let mut scene = SceneState::default();
        scene.set_spotlight_cutoff_degrees(45.0);
        assert_relative_eq!(scene.spotlight_cutoff_radians(), 0.7854, epsilon = 1e-4);
        assert_relative_eq!(scene.lighting_uniforms([0.0; 3]).spotlight_cutoff, std::f32::consts::FRAC_PI_4);
    }

    #[test]
    fn zero_cutoff_is_raised_to_minimum() {
        let mut scene = SceneState::default();
        scene.set_spotlight_cutoff_degrees(0.0);
        let cutoff = scene.lighting_uniforms([0.0; 3]).spotlight_cutoff;
        assert_relative_eq!(cutoff, MIN_SPOTLIGHT_CUTOFF.to_radians(), epsilon = 1e-6);

        // a fragment straight down the spotlight axis stays finite
        let light = Vector3::from(scene.light_pos);
        let below = light + Vector3::new(0.0, -1.0, 0.0);
        let spot = spotlight_factor(light, Vector3::from(scene.spotlight_dir), cutoff, below);
        assert!(spot.is_finite());
        assert_relative_eq!(spot, 1.0, epsilon = 1e-6);

        scene.set_spotlight_cutoff_degrees(-10.0);
        assert_relative_eq!(scene.spotlight_cutoff_radians(), MIN_SPOTLIGHT_CUTOFF.to_radians(), epsilon = 1e-6);
    }

    #[test]
    fn advance_without_animation_only_moves_clock() {
        let mut scene = SceneState::default();
        scene.advance(12.5);
        assert_eq!(scene.seconds, 12.5);
        assert_eq!(scene.light_pos, [2.0, 3.0, 2.0]);
        assert_eq!(scene.animal, AnimalPose::default());
    }

    #[test]
    fn advance_orbits_light_and_turns_animal() {
        let mut scene = SceneState::default();
        scene.set_animate(true);
        scene.advance(std::f64::consts::PI);
        // quarter orbit at 0.5 rad/s
        assert_relative_eq!(scene.light_pos[0], 0.0, epsilon = 1e-5);
        assert_relative_eq!(scene.light_pos[2], 2.0, epsilon = 1e-5);
        assert_eq!(scene.light_pos[1], 3.0);
        assert_relative_eq!(scene.animal.yaw_degrees, 10.0 * std::f32::consts::PI, epsilon = 1e-4);

        let orbit = (scene.light_pos[0].powi(2) + scene.light_pos[2].powi(2)).sqrt();
        assert_relative_eq!(orbit, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn toggles_flip() {
        let mut scene = SceneState::default();
        scene.toggle_light();
        assert!(!scene.light_on);
        scene.toggle_normal_visualization();
        assert!(scene.normal_visualization);
        assert!(scene.lighting_uniforms([0.0; 3]).normal_visualization);
    }

    #[test]
    fn reset_only_touches_animal() {
        let mut scene = SceneState::default();
        scene.set_animate(true);
        scene.advance(3.0);
        scene.set_light_on(false);
        scene.reset();
        assert_eq!(scene.animal, AnimalPose::default());
        assert!(!scene.light_on);
    }
}
