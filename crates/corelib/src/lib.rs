//! Core types: math re-exports, Transform, cameras, lights, input, World.

pub use glam::{EulerRot, Mat4, Quat, Vec3, vec3};

pub mod animation;
pub mod camera;
pub mod ecs;
pub mod input;
pub mod lighting;
pub mod transform;

/// Errors raised by scene-model operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("scene supports at most {max} lights")]
    TooManyLights { max: usize },
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_is_identity_matrix() {
        let t = transform::Transform::identity();
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translate_then_scale_matrix() {
        let t = transform::Transform::from_trs(
            vec3(1.0, 2.0, 3.0),
            vec3(0.0, 0.0, 0.0),
            vec3(2.0, 2.0, 2.0),
        );
        // Last column is the translation, the diagonal the scale.
        let m = t.matrix().to_cols_array();
        assert!((m[12] - 1.0).abs() < 1e-6);
        assert!((m[13] - 2.0).abs() < 1e-6);
        assert!((m[14] - 3.0).abs() < 1e-6);
        assert!((m[0] - 2.0).abs() < 1e-6);
        assert!((m[5] - 2.0).abs() < 1e-6);
        assert!((m[10] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn euler_order_is_x_then_y_then_z() {
        let deg = vec3(30.0, 45.0, 60.0);
        let t = transform::Transform::from_trs_degrees(vec3(1.0, -2.0, 0.5), deg, vec3(2.0, 1.0, 3.0));
        let expected = Mat4::from_translation(vec3(1.0, -2.0, 0.5))
            * Mat4::from_rotation_x(deg.x.to_radians())
            * Mat4::from_rotation_y(deg.y.to_radians())
            * Mat4::from_rotation_z(deg.z.to_radians())
            * Mat4::from_scale(vec3(2.0, 1.0, 3.0));
        assert!(t.matrix().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let t = transform::Transform::from_trs(Vec3::ZERO, Vec3::ZERO, vec3(2.0, 1.0, 1.0));
        let n = t.normal_matrix().transform_vector3(Vec3::X);
        assert!((n - vec3(0.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn camera_pv_is_finite() {
        let cam = camera::Camera::new_perspective(
            vec3(0.0, 0.0, 4.0),
            vec3(0.0, 0.0, 0.0),
            Vec3::Y,
            60f32.to_radians(),
            0.1,
            100.0,
            16.0 / 9.0,
        );
        let pv = cam.proj_view();
        let a = pv.to_cols_array();
        assert!(a.iter().all(|f| f.is_finite()));
    }
}
