//! Per-frame orchestration: advance the scene, upload frame uniforms, draw
//! every object in order, report timing.

use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::animal::BlockyAnimal;
use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::cube::{Cube, CubeMode};
use crate::dome::Dome;
use crate::draw::DrawTarget;
use crate::error::RenderError;
use crate::hud::{self, Hud};
use crate::input::{KeyAction, UiAction};
use crate::matrix::projection;
use crate::scene::SceneState;

/// Something drawn once per frame.
pub trait Renderable {
    fn name(&self) -> &str;

    /// Pulls whatever the object derives from the scene before drawing.
    fn update(&mut self, _scene: &SceneState) {}

    fn render(&mut self, target: &mut dyn DrawTarget) -> Result<(), RenderError>;
}

/// Millisecond clock used to time frames.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Small cube that follows the light and glows in its color.
pub struct LightMarker {
    cube: Cube,
}

impl LightMarker {
    pub const SIZE: f32 = 0.1;

    pub fn new() -> Self {
        let mut cube = Cube::new("light");
        cube.mode = CubeMode::Fast;
        Self { cube }
    }
}

impl Default for LightMarker {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderable for LightMarker {
    fn name(&self) -> &str {
        self.cube.name()
    }

    fn update(&mut self, scene: &SceneState) {
        let [r, g, b] = scene.light_color;
        self.cube.color = [r * 2.0, g * 2.0, b * 2.0, 1.0];
        self.cube.matrix = Matrix4::from_translation(Vector3::from(scene.light_pos))
            * Matrix4::from_scale(Self::SIZE);
    }

    fn render(&mut self, target: &mut dyn DrawTarget) -> Result<(), RenderError> {
        self.cube.render(target)
    }
}

/// What one frame did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub rendered: Vec<String>,
    pub failed: Vec<String>,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Stop,
}

pub struct FrameOrchestrator {
    pub camera: Camera,
    pub scene: SceneState,
    config: ViewerConfig,
    objects: Vec<Box<dyn Renderable>>,
    start_ms: Option<f64>,
    running: bool,
}

impl FrameOrchestrator {
    /// Builds the default world: ground, light marker, sky dome, jellyfish.
    pub fn new(config: ViewerConfig) -> Self {
        let ground = Cube::new("ground")
            .with_color([0.3, 0.3, 0.3, 1.0])
            .with_matrix(
                Matrix4::from_translation(Vector3::new(-5.0, -2.0, -5.0))
                    * Matrix4::from_nonuniform_scale(10.0, 0.1, 10.0),
            );

        let mut sky = Dome::new(config.dome_params());
        sky.color = [0.45, 0.65, 0.95, 1.0];
        sky.matrix = Matrix4::from_translation(Vector3::new(0.0, -2.0, 0.0)) * Matrix4::from_scale(20.0);

        let mut animal_bell = config.dome_params();
        animal_bell.segments = animal_bell.segments.min(16);

        let objects: Vec<Box<dyn Renderable>> = vec![
            Box::new(ground),
            Box::new(LightMarker::new()),
            Box::new(sky),
            Box::new(BlockyAnimal::new(animal_bell)),
        ];
        Self::with_objects(config, objects)
    }

    pub fn with_objects(config: ViewerConfig, objects: Vec<Box<dyn Renderable>>) -> Self {
        Self {
            camera: Camera::new(config.move_step, config.pan_step),
            scene: SceneState::default(),
            config,
            objects,
            start_ms: None,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn object_names(&self) -> Vec<&str> {
        self.objects.iter().map(|o| o.name()).collect()
    }

    /// One animation tick at `now_ms`. Returns whether the loop should keep
    /// scheduling frames.
    pub fn tick(
        &mut self,
        now_ms: f64,
        viewport: (u32, u32),
        target: &mut dyn DrawTarget,
        hud: &mut dyn Hud,
        clock: &dyn Clock,
    ) -> FrameOutcome {
        let start = *self.start_ms.get_or_insert(now_ms);
        let seconds = (now_ms - start) / 1000.0;
        self.scene.advance(seconds);

        self.render(viewport, target, hud, clock);

        if let Some(limit) = self.config.stop_after_seconds {
            if seconds >= limit {
                log::info!("stopping frame loop after {:.1}s", seconds);
                self.running = false;
                return FrameOutcome::Stop;
            }
        }
        FrameOutcome::Continue
    }

    /// Draws the current state without advancing time.
    pub fn render(
        &mut self,
        viewport: (u32, u32),
        target: &mut dyn DrawTarget,
        hud: &mut dyn Hud,
        clock: &dyn Clock,
    ) -> FrameReport {
        let frame_start = clock.now_ms();

        let (width, height) = viewport;
        let proj = projection(
            self.config.fov_degrees,
            width,
            height,
            self.config.near,
            self.config.far,
        );
        target.set_camera(&proj, &self.camera.view_matrix(), &Matrix4::identity());
        target.clear();
        target.set_lighting(&self.scene.lighting_uniforms(self.camera.eye_array()));

        let mut report = FrameReport::default();
        for object in self.objects.iter_mut() {
            object.update(&self.scene);
            match object.render(target) {
                Ok(()) => report.rendered.push(object.name().to_string()),
                Err(err) => {
                    log::error!("could not render {}: {}", object.name(), err);
                    report.failed.push(object.name().to_string());
                }
            }
        }

        report.duration_ms = clock.now_ms() - frame_start;
        hud.show(hud::TIMING_REGION, &hud::timing_text(report.duration_ms));
        hud.show(hud::INSTRUCTIONS_REGION, hud::INSTRUCTIONS);
        report
    }

    pub fn apply_key(&mut self, action: KeyAction) {
        match action {
            KeyAction::MoveForward => self.camera.move_forward(),
            KeyAction::MoveBackwards => self.camera.move_backwards(),
            KeyAction::MoveLeft => self.camera.move_left(),
            KeyAction::MoveRight => self.camera.move_right(),
            KeyAction::PanLeft => self.camera.pan_left(),
            KeyAction::PanRight => self.camera.pan_right(),
            KeyAction::ToggleNormals => self.scene.toggle_normal_visualization(),
            KeyAction::ToggleLight => self.scene.toggle_light(),
        }
    }

    pub fn apply_ui(&mut self, action: UiAction) {
        match action {
            UiAction::Reset => {
                self.camera.reset();
                self.scene.reset();
            }
            UiAction::NormalVisualization(on) => self.scene.set_normal_visualization(on),
            UiAction::Light(on) => self.scene.set_light_on(on),
            UiAction::LightSlider(axis, raw) => self.scene.set_light_axis_from_slider(axis, raw),
            UiAction::LightColorSlider(channel, raw) => {
                self.scene.set_light_color_from_slider(channel, raw)
            }
            UiAction::Spotlight(on) => self.scene.set_spotlight_on(on),
            UiAction::SpotlightCutoff(degrees) => self.scene.set_spotlight_cutoff_degrees(degrees),
            UiAction::Animate(on) => self.scene.set_animate(on),
        }
    }

    /// Yaw from a horizontal drag of `dx` pixels; dragging right turns right.
    pub fn apply_drag(&mut self, dx: f64) {
        self.camera.pan(-(dx as f32) * self.config.mouse_pan_scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::recording::{Call, RecordingTarget};
    use crate::scene::Axis;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use cgmath::{Point3, Transform};
    use std::cell::Cell;

    struct FakeClock {
        now: Cell<f64>,
        step: f64,
    }

    impl FakeClock {
        fn new(step: f64) -> Self {
            Self {
                now: Cell::new(0.0),
                step,
            }
        }
    }

    impl Clock for FakeClock {
        fn now_ms(&self) -> f64 {
            let t = self.now.get();
            self.now.set(t + self.step);
            t
        }
    }

    #[derive(Default)]
    struct RecordingHud {
        lines: Vec<(String, String)>,
    }

    impl Hud for RecordingHud {
        fn show(&mut self, region: &str, text: &str) {
            self.lines.push((region.to_string(), text.to_string()));
        }
    }

    struct Broken;

    impl Renderable for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn render(&mut self, _target: &mut dyn DrawTarget) -> Result<(), RenderError> {
            Err(RenderError::BufferAllocation("uv"))
        }
    }

    fn small_config() -> ViewerConfig {
        ViewerConfig {
            dome_segments: 8,
            ..ViewerConfig::default()
        }
    }

    #[test]
    fn frame_uploads_then_draws_in_order() {
        let mut frame = FrameOrchestrator::new(small_config());
        let mut target = RecordingTarget::default();
        let mut hud = RecordingHud::default();
        let report = frame.render((800, 600), &mut target, &mut hud, &FakeClock::new(4.0));

        assert!(matches!(target.calls[0], Call::Camera { .. }));
        assert_eq!(target.calls[1], Call::Clear);
        assert!(matches!(target.calls[2], Call::Lighting(_)));
        assert_eq!(report.rendered, vec!["ground", "light", "dome", "jellyfish"]);
        assert!(report.failed.is_empty());
        assert_eq!(report.duration_ms, 4.0);
    }

    #[test]
    fn ground_is_centered_under_the_origin() {
        let mut frame = FrameOrchestrator::new(small_config());
        let mut target = RecordingTarget::default();
        frame.render((800, 600), &mut target, &mut RecordingHud::default(), &FakeClock::new(1.0));
        let ground = target.models()[0];
        let center = ground.transform_point(Point3::new(0.5, 0.0, 0.5));
        assert_abs_diff_eq!(center, Point3::new(0.0, -2.0, 0.0), epsilon = 1e-6);
        let corner = ground.transform_point(Point3::new(1.0, 1.0, 1.0));
        assert_abs_diff_eq!(corner, Point3::new(5.0, -1.9, 5.0), epsilon = 1e-6);
    }

    #[test]
    fn frame_uniforms_reflect_camera_and_scene() {
        let mut frame = FrameOrchestrator::new(small_config());
        frame.apply_ui(UiAction::SpotlightCutoff(45.0));
        let mut target = RecordingTarget::default();
        frame.render((800, 600), &mut target, &mut RecordingHud::default(), &FakeClock::new(1.0));

        match &target.calls[0] {
            Call::Camera { view, global_rotation, .. } => {
                assert_eq!(*view, frame.camera.view_matrix());
                assert_eq!(*global_rotation, Matrix4::identity());
            }
            other => panic!("expected camera upload, got {:?}", other),
        }
        match &target.calls[2] {
            Call::Lighting(l) => {
                assert_eq!(l.camera_pos, [0.0, 0.0, 5.0]);
                assert_relative_eq!(l.spotlight_cutoff, 0.7854, epsilon = 1e-4);
            }
            other => panic!("expected lighting upload, got {:?}", other),
        }
    }

    #[test]
    fn failing_object_does_not_stop_the_frame() {
        let objects: Vec<Box<dyn Renderable>> = vec![
            Box::new(Cube::new("first")),
            Box::new(Broken),
            Box::new(Cube::new("last")),
        ];
        let mut frame = FrameOrchestrator::with_objects(small_config(), objects);
        let mut target = RecordingTarget::default();
        let report = frame.render((1, 1), &mut target, &mut RecordingHud::default(), &FakeClock::new(1.0));
        assert_eq!(report.rendered, vec!["first", "last"]);
        assert_eq!(report.failed, vec!["broken"]);
        assert_eq!(target.submitted_triangles(), 24);
    }

    #[test]
    fn allocation_failures_degrade_every_object() {
        let mut frame = FrameOrchestrator::new(small_config());
        let mut target = RecordingTarget {
            fail_submits: true,
            ..RecordingTarget::default()
        };
        let report = frame.render((800, 600), &mut target, &mut RecordingHud::default(), &FakeClock::new(1.0));
        assert_eq!(report.failed.len(), 4);
        assert!(report.rendered.is_empty());
    }

    #[test]
    fn hud_gets_timing_and_instructions() {
        let mut frame = FrameOrchestrator::new(small_config());
        let mut hud = RecordingHud::default();
        frame.render((800, 600), &mut RecordingTarget::default(), &mut hud, &FakeClock::new(16.0));
        assert_eq!(
            hud.lines,
            vec![
                (hud::TIMING_REGION.to_string(), " ms: 16 fps: 62.5".to_string()),
                (hud::INSTRUCTIONS_REGION.to_string(), hud::INSTRUCTIONS.to_string()),
            ]
        );
    }

    #[test]
    fn tick_animates_light_marker() {
        let mut frame = FrameOrchestrator::new(small_config());
        frame.apply_ui(UiAction::Animate(true));
        let clock = FakeClock::new(1.0);
        let mut hud = RecordingHud::default();
        frame.tick(1000.0, (800, 600), &mut RecordingTarget::default(), &mut hud, &clock);
        let mut target = RecordingTarget::default();
        frame.tick(1000.0 + std::f64::consts::PI * 1000.0, (800, 600), &mut target, &mut hud, &clock);

        assert_relative_eq!(frame.scene.light_pos[2], 2.0, epsilon = 1e-4);
        // second model upload is the light marker
        let marker = target.models()[1];
        assert_relative_eq!(marker.w.z, 2.0, epsilon = 1e-4);
        assert_relative_eq!(marker.x.x, LightMarker::SIZE);
    }

    #[test]
    fn tick_stops_after_configured_time() {
        let config = ViewerConfig {
            stop_after_seconds: Some(5.0),
            ..small_config()
        };
        let mut frame = FrameOrchestrator::new(config);
        let clock = FakeClock::new(1.0);
        let mut hud = RecordingHud::default();
        let mut target = RecordingTarget::default();
        assert_eq!(frame.tick(0.0, (8, 8), &mut target, &mut hud, &clock), FrameOutcome::Continue);
        assert_eq!(frame.tick(4999.0, (8, 8), &mut target, &mut hud, &clock), FrameOutcome::Continue);
        assert_eq!(frame.tick(5000.0, (8, 8), &mut target, &mut hud, &clock), FrameOutcome::Stop);
        assert!(!frame.is_running());
    }

    #[test]
    fn keys_and_controls_reach_camera_and_scene() {
        let mut frame = FrameOrchestrator::new(small_config());
        frame.apply_key(KeyAction::MoveForward);
        assert_relative_eq!(frame.camera.eye().z, 4.8, epsilon = 1e-6);
        frame.apply_key(KeyAction::ToggleLight);
        assert!(!frame.scene.light_on);
        frame.apply_ui(UiAction::LightSlider(Axis::X, 150.0));
        assert_eq!(frame.scene.light_pos[0], 3.0);

        frame.apply_ui(UiAction::Reset);
        assert_eq!(frame.camera.eye().z, 5.0);
    }

    #[test]
    fn dragging_right_turns_right() {
        let mut frame = FrameOrchestrator::new(small_config());
        frame.apply_drag(20.0);
        assert!(frame.camera.at().x > 0.0);
    }
}
