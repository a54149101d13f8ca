use crate::{Mat4, Vec3};

/// Simple perspective camera (right-handed).
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
}

impl Camera {
    #[allow(clippy::too_many_arguments)]
    pub fn new_perspective(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y_rad: f32,
        z_near: f32,
        z_far: f32,
        aspect: f32,
    ) -> Self {
        Self {
            eye,
            target,
            up,
            fov_y_rad,
            z_near,
            z_far,
            aspect,
        }
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// wgpu-style projection (z in [0,1]); glam's `perspective_rh` already
    /// targets that range.
    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[inline]
    pub fn proj_view(&self) -> Mat4 {
        self.proj() * self.view()
    }

    #[inline]
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }
}

/// Lens settings shared by the camera rigs below.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lens {
    pub fov_y_deg: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            fov_y_deg: 45.0,
            z_near: 0.1,
            z_far: 100.0,
        }
    }
}

const PITCH_LIMIT_DEG: f32 = 89.0;

/// Direction for yaw/pitch in degrees; yaw -90 looks down -Z.
fn direction(yaw_deg: f32, pitch_deg: f32) -> Vec3 {
    let (yaw, pitch) = (yaw_deg.to_radians(), pitch_deg.to_radians());
    Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
}

/// First-person camera: position plus yaw/pitch in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub lens: Lens,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0), -90.0, 0.0)
    }
}

impl FlyCamera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG),
            lens: Lens::default(),
        }
    }

    #[inline]
    pub fn front(&self) -> Vec3 {
        direction(self.yaw, self.pitch)
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.front().cross(Vec3::Y).normalize()
    }

    pub fn move_forward(&mut self, delta: f32) {
        self.position += self.front() * delta;
    }

    pub fn move_right(&mut self, delta: f32) {
        self.position += self.right() * delta;
    }

    /// World-space vertical move, independent of where the camera looks.
    pub fn move_up(&mut self, delta: f32) {
        self.position.y += delta;
    }

    /// Pitch is clamped to +-89 degrees.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
    }

    pub fn camera(&self, aspect: f32) -> Camera {
        let front = self.front();
        let up = self.right().cross(front).normalize();
        Camera::new_perspective(
            self.position,
            self.position + front,
            up,
            self.lens.fov_y_deg.to_radians(),
            self.lens.z_near,
            self.lens.z_far,
            aspect,
        )
    }
}

/// Camera on a sphere around `target`; angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
    /// Rotation of the up vector around the view axis.
    pub roll: f32,
    pub lens: Lens,
}

impl OrbitCamera {
    pub const MIN_RADIUS: f32 = 1.0;

    pub fn new(target: Vec3, radius: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            target,
            radius: radius.max(Self::MIN_RADIUS),
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG),
            roll: 0.0,
            lens: Lens::default(),
        }
    }

    #[inline]
    pub fn eye(&self) -> Vec3 {
        self.target + direction(self.yaw, self.pitch) * self.radius
    }

    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
    }

    /// Positive values move away from the target; radius never drops below 1.
    pub fn zoom(&mut self, delta: f32) {
        self.radius = (self.radius + delta).max(Self::MIN_RADIUS);
    }

    pub fn roll_by(&mut self, delta: f32) {
        self.roll += delta;
    }

    pub fn up(&self) -> Vec3 {
        if self.roll == 0.0 {
            return Vec3::Y;
        }
        let axis = (self.eye() - self.target).normalize();
        crate::Quat::from_axis_angle(axis, self.roll.to_radians()) * Vec3::Y
    }

    pub fn camera(&self, aspect: f32) -> Camera {
        Camera::new_perspective(
            self.eye(),
            self.target,
            self.up(),
            self.lens.fov_y_deg.to_radians(),
            self.lens.z_near,
            self.lens.z_far,
            aspect,
        )
    }
}
