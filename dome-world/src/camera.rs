use cgmath::{
    Deg, EuclideanSpace, InnerSpace, Matrix3, Matrix4, Point3, SquareMatrix, Vector3,
};

use crate::error::GeometryError;

pub const DEFAULT_EYE: Point3<f32> = Point3::new(0.0, 0.0, 5.0);
pub const DEFAULT_AT: Point3<f32> = Point3::new(0.0, 0.0, 0.0);
pub const DEFAULT_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

const DEGENERATE_EPSILON: f32 = 1e-6;

/// First-person camera. Every mutator re-derives the view matrix, so
/// `view_matrix()` always reflects the current pose.
#[derive(Debug, Clone)]
pub struct Camera {
    eye: Point3<f32>,
    at: Point3<f32>,
    up: Vector3<f32>,
    view_matrix: Matrix4<f32>,
    move_step: f32,
    pan_step: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(0.2, 5.0)
    }
}

impl Camera {
    /// `move_step` is in world units, `pan_step` in degrees.
    pub fn new(move_step: f32, pan_step: f32) -> Self {
        let mut camera = Self {
            eye: DEFAULT_EYE,
            at: DEFAULT_AT,
            up: DEFAULT_UP,
            view_matrix: Matrix4::identity(),
            move_step,
            pan_step,
        };
        camera.update_view_matrix();
        camera
    }

    pub fn eye(&self) -> Point3<f32> {
        self.eye
    }

    pub fn at(&self) -> Point3<f32> {
        self.at
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn move_step(&self) -> f32 {
        self.move_step
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view_matrix
    }

    /// Restores the default pose, keeping the step sizes.
    pub fn reset(&mut self) {
        self.eye = DEFAULT_EYE;
        self.at = DEFAULT_AT;
        self.up = DEFAULT_UP;
        self.update_view_matrix();
    }

    /// Replaces the pose. Collinear or coincident eye/at/up are rejected and
    /// the previous pose is kept.
    pub fn set_pose(
        &mut self,
        eye: Point3<f32>,
        at: Point3<f32>,
        up: Vector3<f32>,
    ) -> Result<(), GeometryError> {
        if is_degenerate(at - eye, up) {
            return Err(GeometryError::DegeneratePose);
        }
        self.eye = eye;
        self.at = at;
        self.up = up;
        self.update_view_matrix();
        Ok(())
    }

    fn forward(&self) -> Vector3<f32> {
        (self.at - self.eye).normalize()
    }

    fn translate(&mut self, delta: Vector3<f32>) {
        self.eye += delta;
        self.at += delta;
        self.update_view_matrix();
    }

    pub fn move_forward(&mut self) {
        let delta = self.forward() * self.move_step;
        self.translate(delta);
    }

    pub fn move_backwards(&mut self) {
        let delta = self.forward() * -self.move_step;
        self.translate(delta);
    }

    pub fn move_left(&mut self) {
        let side = self.up.cross(self.forward()).normalize();
        self.translate(side * self.move_step);
    }

    pub fn move_right(&mut self) {
        let side = self.forward().cross(self.up).normalize();
        self.translate(side * self.move_step);
    }

    pub fn pan_left(&mut self) {
        self.pan(self.pan_step);
    }

    pub fn pan_right(&mut self) {
        self.pan(-self.pan_step);
    }

    /// Yaws the view around the up axis by `angle` degrees with the eye
    /// fixed. Positive angles turn left.
    pub fn pan(&mut self, angle: f32) {
        let rotation = Matrix3::from_axis_angle(self.up.normalize(), Deg(angle));
        let direction = rotation * (self.at - self.eye);
        self.at = self.eye + direction;
        self.update_view_matrix();
    }

    /// Derives the look-at matrix and re-orthogonalizes `up` against the
    /// current forward direction.
    pub fn update_view_matrix(&mut self) {
        let forward = self.at - self.eye;
        if is_degenerate(forward, self.up) {
            log::warn!(
                "degenerate camera pose eye={:?} at={:?} up={:?}, keeping previous view",
                self.eye,
                self.at,
                self.up
            );
            return;
        }
        let forward = forward.normalize();
        let right = forward.cross(self.up).normalize();
        self.up = right.cross(forward);
        self.view_matrix = Matrix4::look_at_rh(self.eye, self.at, self.up);
    }

    pub fn eye_array(&self) -> [f32; 3] {
        self.eye.to_vec().into()
    }
}

fn is_degenerate(forward: Vector3<f32>, up: Vector3<f32>) -> bool {
    forward.magnitude2() < DEGENERATE_EPSILON
        || up.magnitude2() < DEGENERATE_EPSILON
        || forward.normalize().cross(up.normalize()).magnitude2() < DEGENERATE_EPSILON
}
