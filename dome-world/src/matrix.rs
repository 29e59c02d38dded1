use cgmath::{perspective, Deg, Matrix, Matrix4, SquareMatrix};

/// Converts a cgmath::Matrix4<f32> into a column-major [f32; 16] array for WebGL.
pub fn matrix4_to_array(matrix: &Matrix4<f32>) -> [f32; 16] {
    [
        matrix.x.x, matrix.x.y, matrix.x.z, matrix.x.w, matrix.y.x, matrix.y.y, matrix.y.z,
        matrix.y.w, matrix.z.x, matrix.z.y, matrix.z.z, matrix.z.w, matrix.w.x, matrix.w.y,
        matrix.w.z, matrix.w.w,
    ]
}

/// Inverse-transpose of the model matrix, for carrying normals into world
/// space. A singular model (e.g. a zero scale) falls back to identity.
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix4<f32> {
    model
        .invert()
        .map(|inv| inv.transpose())
        .unwrap_or_else(Matrix4::identity)
}

/// Perspective projection; a zero-height viewport is treated as square.
pub fn projection(fov_degrees: f32, width: u32, height: u32, near: f32, far: f32) -> Matrix4<f32> {
    let aspect = if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    };
    perspective(Deg(fov_degrees), aspect, near, far)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::{Point3, Transform, Vector3, Vector4};

    #[test]
    fn array_is_column_major() {
        let m = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let a = matrix4_to_array(&m);
        assert_eq!(&a[12..15], &[1.0, 2.0, 3.0]);
        assert_eq!(a[15], 1.0);
    }

    #[test]
    fn normal_matrix_undoes_nonuniform_scale() {
        let model = Matrix4::from_nonuniform_scale(10.0, 0.1, 10.0);
        let n = normal_matrix(&model) * Vector4::new(0.0, 1.0, 0.0, 0.0);
        assert_relative_eq!(n.y, 10.0, epsilon = 1e-4);
        assert_eq!(normal_matrix(&Matrix4::from_scale(0.0)), Matrix4::identity());
    }

    #[test]
    fn projection_maps_near_plane_to_minus_one() {
        let p = projection(60.0, 800, 600, 0.1, 100.0);
        let ndc = p.transform_point(Point3::new(0.0, 0.0, -0.1));
        assert_relative_eq!(ndc.z, -1.0, epsilon = 1e-4);
        let far = p.transform_point(Point3::new(0.0, 0.0, -100.0));
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn zero_height_viewport_does_not_divide_by_zero() {
        let p = projection(60.0, 800, 0, 0.1, 100.0);
        assert!(p.x.x.is_finite());
        assert_relative_eq!(p.x.x, p.y.y);
    }
}
