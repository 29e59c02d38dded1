//! The jellyfish: a dome bell with jointed two-segment tentacles hanging
//! from its rim. Each lower segment hangs off the end of its upper segment,
//! so the tentacles are short transform chains rooted at the bell.

use cgmath::{Deg, Matrix4, Vector3};

use crate::cube::Cube;
use crate::dome::{Dome, DomeParams};
use crate::draw::DrawTarget;
use crate::error::RenderError;
use crate::frame::Renderable;
use crate::scene::{AnimalPose, SceneState};

const TENTACLES: usize = 4;
const RIM_OFFSET: f32 = 0.3;
const UPPER_LENGTH: f32 = 0.35;
const UPPER_WIDTH: f32 = 0.08;
const LOWER_LENGTH: f32 = 0.3;
const LOWER_WIDTH: f32 = 0.06;
const SWAY_SPEED: f32 = 2.0;
const UPPER_SWAY: f32 = 15.0;
const LOWER_SWAY: f32 = 20.0;

/// Joint frames of one tentacle. The lower joint sits at the tip of the
/// upper segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TentacleJoints {
    pub upper: Matrix4<f32>,
    pub lower: Matrix4<f32>,
}

pub struct BlockyAnimal {
    bell: Dome,
    upper: Cube,
    lower: Cube,
    pose: AnimalPose,
    seconds: f32,
}

impl BlockyAnimal {
    pub fn new(bell: DomeParams) -> Self {
        let mut dome = Dome::new(bell);
        dome.color = [0.9, 0.5, 0.8, 0.85];
        Self {
            bell: dome,
            upper: Cube::new("tentacle").with_color([0.85, 0.45, 0.75, 1.0]),
            lower: Cube::new("tentacle tip").with_color([0.95, 0.7, 0.9, 1.0]),
            pose: AnimalPose::default(),
            seconds: 0.0,
        }
    }

    /// Swing angles in degrees of the upper and lower joints of tentacle `i`.
    pub fn sway(&self, i: usize) -> (f32, f32) {
        let phase = self.seconds * SWAY_SPEED + i as f32;
        (UPPER_SWAY * phase.sin(), LOWER_SWAY * (phase + 0.5).sin())
    }

    pub fn joints(&self) -> Vec<TentacleJoints> {
        let body = self.pose.matrix();
        (0..TENTACLES)
            .map(|i| {
                let around = Deg(45.0 + 90.0 * i as f32);
                let (upper_sway, lower_sway) = self.sway(i);
                let upper = body
                    * Matrix4::from_angle_y(around)
                    * Matrix4::from_translation(Vector3::new(RIM_OFFSET, 0.0, 0.0))
                    * Matrix4::from_angle_z(Deg(upper_sway));
                let lower = upper
                    * Matrix4::from_translation(Vector3::new(0.0, -UPPER_LENGTH, 0.0))
                    * Matrix4::from_angle_z(Deg(lower_sway));
                TentacleJoints { upper, lower }
            })
            .collect()
    }
}

/// Box of `length` hanging straight down from the joint origin.
fn hanging(joint: &Matrix4<f32>, width: f32, length: f32) -> Matrix4<f32> {
    joint
        * Matrix4::from_translation(Vector3::new(-width / 2.0, -length, -width / 2.0))
        * Matrix4::from_nonuniform_scale(width, length, width)
}

impl Renderable for BlockyAnimal {
    fn name(&self) -> &str {
        "jellyfish"
    }

    fn update(&mut self, scene: &SceneState) {
        self.pose = scene.animal;
        self.seconds = scene.seconds as f32;
    }

    fn render(&mut self, target: &mut dyn DrawTarget) -> Result<(), RenderError> {
        let body = self.pose.matrix();
        self.bell.render_with(target, &body)?;
        for joint in self.joints() {
            self.upper
                .render_with(target, &hanging(&joint.upper, UPPER_WIDTH, UPPER_LENGTH))?;
            self.lower
                .render_with(target, &hanging(&joint.lower, LOWER_WIDTH, LOWER_LENGTH))?;
        }
        Ok(())
    }
}
